use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Supabase
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: Option<String>,

    // Storage
    pub storage_bucket: String,

    // Admin accounts
    pub admin_email_domain: String,
    pub admin_username: String,
    pub admin_password: Option<String>,

    // API key for the seed endpoint
    pub api_key: Option<String>,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Supabase - project URL and public (anon) key are mandatory
            supabase_url: std::env::var("SUPABASE_URL")
                .context("SUPABASE_URL not set")?
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY")
                .context("SUPABASE_ANON_KEY not set")?,
            supabase_service_role_key: non_empty_var("SUPABASE_SERVICE_ROLE_KEY"),

            storage_bucket: std::env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "post-images".to_string()),

            admin_email_domain: std::env::var("ADMIN_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "@admin.local".to_string()),
            admin_username: std::env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            admin_password: non_empty_var("ADMIN_PASSWORD"),

            api_key: non_empty_var("API_KEY"),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Internal auth email for a bare admin username.
    pub fn admin_email(&self, username: &str) -> String {
        format!("{}{}", username.trim(), self.admin_email_domain)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
