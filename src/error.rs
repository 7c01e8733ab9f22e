use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// PostgREST code for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST code returned when a single-object read matches no rows.
pub const NO_ROWS: &str = "PGRST116";

const INVALID_CREDENTIALS_MARKER: &str = "Invalid login credentials";

/// Errors from the data service and the admin operations built on it.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("a post with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Auth service failure; its message is meant for the person signing in.
    #[error("auth service error ({status}) {code}: {message}")]
    Auth {
        status: u16,
        code: String,
        message: String,
    },

    #[error("data service error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("request to data service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode data service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Text shown to an editor in a notification.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::DuplicateSlug(_) => "A post with this slug already exists".to_string(),
            ServiceError::InvalidCredentials => "Invalid username or password".to_string(),
            ServiceError::NotFound(what) => format!("{} not found", capitalize(what)),
            ServiceError::Validation(message) => message.clone(),
            ServiceError::Unauthorized(_) => "Please sign in again".to_string(),
            ServiceError::Forbidden(_) => "Access denied: administrator role required".to_string(),
            ServiceError::Auth { message, .. } if !message.is_empty() => message.clone(),
            // Raw database text is for the logs, not for editors
            ServiceError::Auth { .. }
            | ServiceError::Api { .. }
            | ServiceError::Http(_)
            | ServiceError::Decode(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }

    /// Stable machine-readable code for the JSON error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::DuplicateSlug(_) => "DUPLICATE_SLUG",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::Auth { .. } => "AUTH_SERVICE_ERROR",
            ServiceError::Api { .. } => "DATA_SERVICE_ERROR",
            ServiceError::Http(_) => "DATA_SERVICE_UNREACHABLE",
            ServiceError::Decode(_) => "DATA_SERVICE_DECODE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DuplicateSlug(_) => StatusCode::CONFLICT,
            ServiceError::InvalidCredentials | ServiceError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Auth { .. }
            | ServiceError::Api { .. }
            | ServiceError::Http(_)
            | ServiceError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Map a PostgREST error body to a typed error. `slug` names the post
    /// being written, if any, so unique violations can be reported on it.
    pub fn from_postgrest(status: u16, body: &str, slug: Option<&str>) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.code_string();
        let message = parsed.message.unwrap_or_else(|| body.trim().to_string());

        match code.as_str() {
            UNIQUE_VIOLATION => ServiceError::DuplicateSlug(slug.unwrap_or_default().to_string()),
            NO_ROWS => ServiceError::NotFound("record".to_string()),
            _ if status == 401 || status == 403 => ServiceError::Unauthorized(message),
            _ => ServiceError::Api {
                status,
                code,
                message,
            },
        }
    }

    /// Map an auth service error body. Any variant of the invalid-credentials
    /// message becomes [`ServiceError::InvalidCredentials`]; other messages
    /// are kept for display as [`ServiceError::Auth`].
    pub fn from_auth(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.code_string();
        let message = parsed
            .error_description
            .or(parsed.msg)
            .or(parsed.message)
            .unwrap_or_else(|| body.trim().to_string());

        if message.contains(INVALID_CREDENTIALS_MARKER) {
            ServiceError::InvalidCredentials
        } else {
            ServiceError::Auth {
                status,
                code: parsed.error.unwrap_or(code),
                message,
            }
        }
    }
}

/// Error details inside the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope: `{ "success": false, "error": { code, message } }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &ServiceError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.code().to_string(),
                message: error.user_message(),
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (self.status_code(), Json(ErrorResponse::new(&self))).into_response()
    }
}

/// Union of the error shapes PostgREST, GoTrue and Storage return.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    // String for PostgREST, numeric for some auth responses
    code: Option<Value>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ErrorBody {
    fn code_string(&self) -> String {
        match &self.code {
            Some(Value::String(code)) => code.clone(),
            Some(Value::Number(code)) => code.to_string(),
            _ => String::new(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== PostgREST Mapping ====================

    #[test]
    fn test_unique_violation_is_duplicate_slug() {
        let body = r#"{"code":"23505","details":"Key (slug)=(x) already exists.","message":"duplicate key value violates unique constraint \"posts_slug_key\""}"#;
        let err = ServiceError::from_postgrest(409, body, Some("summer-sale"));

        assert!(matches!(err, ServiceError::DuplicateSlug(ref slug) if slug == "summer-sale"));
        assert_eq!(err.user_message(), "A post with this slug already exists");
        assert_eq!(err.code(), "DUPLICATE_SLUG");
    }

    #[test]
    fn test_no_rows_is_not_found() {
        let body = r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#;
        let err = ServiceError::from_postgrest(406, body, None);
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.user_message(), "Record not found");
    }

    #[test]
    fn test_permission_denied_is_unauthorized() {
        let body = r#"{"code":"42501","message":"permission denied for table posts"}"#;
        let err = ServiceError::from_postgrest(403, body, None);
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn test_other_postgrest_errors_keep_details() {
        let body = r#"{"code":"22P02","message":"invalid input syntax for type uuid"}"#;
        match ServiceError::from_postgrest(400, body, None) {
            ServiceError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "22P02");
                assert_eq!(message, "invalid input syntax for type uuid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body_becomes_message() {
        let err = ServiceError::from_postgrest(502, "Bad Gateway\n", None);
        assert!(matches!(&err, ServiceError::Api { message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn test_postgrest_text_is_not_shown_to_editors() {
        let body = r#"{"code":"23502","message":"null value in column \"title_en\" violates not-null constraint"}"#;
        let err = ServiceError::from_postgrest(400, body, Some("summer"));
        assert_eq!(err.user_message(), "Something went wrong, please try again");
        assert_eq!(err.code(), "DATA_SERVICE_ERROR");
    }

    // ==================== Auth Mapping ====================

    #[test]
    fn test_invalid_credentials_in_any_field() {
        for body in [
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
            r#"{"code":400,"msg":"Invalid login credentials"}"#,
            r#"{"message":"Invalid login credentials"}"#,
        ] {
            let err = ServiceError::from_auth(400, body);
            assert!(matches!(err, ServiceError::InvalidCredentials), "{}", body);
            assert_eq!(err.user_message(), "Invalid username or password");
        }
    }

    #[test]
    fn test_other_auth_errors_pass_through() {
        let body = r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#;
        let err = ServiceError::from_auth(400, body);
        assert!(matches!(err, ServiceError::Auth { status: 400, .. }));
        assert_eq!(err.user_message(), "Email not confirmed");
        assert_eq!(err.code(), "AUTH_SERVICE_ERROR");
    }

    // ==================== Envelope ====================

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::DuplicateSlug("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::NotFound("post".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Decode("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ServiceError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ErrorResponse::new(&ServiceError::InvalidCredentials)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": { "code": "INVALID_CREDENTIALS", "message": "Invalid username or password" }
            })
        );
    }

    #[test]
    fn test_generic_message_when_empty() {
        let err = ServiceError::Api {
            status: 500,
            code: String::new(),
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Something went wrong, please try again");
    }
}
