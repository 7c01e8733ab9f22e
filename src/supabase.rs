use crate::config::Config;
use crate::error::ServiceError;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Media type asking PostgREST for exactly one row as a bare object.
pub const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Thin client for a Supabase project: PostgREST, Storage and GoTrue share
/// one base URL and the same key headers.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
        }
    }

    /// Client acting with the public (anon) key.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    /// Client acting with the service role key, if one is configured.
    pub fn service_role(config: &Config) -> Option<Self> {
        config
            .supabase_service_role_key
            .as_deref()
            .map(|key| Self::new(&config.supabase_url, key))
    }

    /// Same client, acting as the signed-in user holding `token`.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            access_token: Some(token.to_string()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request with `apikey` and bearer headers set. The bearer is the user
    /// token when present, otherwise the key itself.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }
}

/// Decode a successful JSON response, mapping failures through `on_error`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    on_error: impl FnOnce(u16, &str) -> ServiceError,
) -> Result<T, ServiceError> {
    let response = check_status(response, on_error).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Return the response unchanged if it succeeded, else the mapped error.
pub(crate) async fn check_status(
    response: Response,
    on_error: impl FnOnce(u16, &str) -> ServiceError,
) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("Data service returned {}: {}", status, body);
    Err(on_error(status.as_u16(), &body))
}
