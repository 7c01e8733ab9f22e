use crate::db::Database;
use crate::error::ServiceError;
use crate::supabase::{read_json, SupabaseClient};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Role granted to the seeded administrator.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session as returned by the password grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct NewUser<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
}

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<AuthUser>,
}

/// Result of provisioning the administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    pub created: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Username/password sign-in. Admin usernames are mapped to internal
/// emails by appending a fixed domain suffix.
#[derive(Debug, Clone)]
pub struct Auth {
    client: SupabaseClient,
    email_domain: String,
}

impl Auth {
    pub fn new(client: SupabaseClient, email_domain: &str) -> Self {
        Self {
            client,
            email_domain: email_domain.to_string(),
        }
    }

    /// Internal email for a username: `admin` → `admin@admin.local`.
    pub fn email_for(&self, username: &str) -> String {
        format!("{}{}", username.trim(), self.email_domain)
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, ServiceError> {
        let email = self.email_for(username);
        let response = self
            .client
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant {
                email: &email,
                password,
            })
            .send()
            .await?;

        let session: Session = read_json(response, ServiceError::from_auth)
            .await
            .inspect_err(|e| warn!("Sign-in failed for {}: {}", email, e))?;
        info!("Signed in {}", email);
        Ok(session)
    }

    /// The user owning `token`, or `Unauthorized` if the token is not valid.
    pub async fn user_for_token(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let response = self
            .client
            .with_token(token)
            .request(Method::GET, "/auth/v1/user")
            .send()
            .await?;

        read_json(response, |status, body| match status {
            401 | 403 => ServiceError::Unauthorized("invalid or expired session".to_string()),
            _ => ServiceError::from_auth(status, body),
        })
        .await
    }
}

/// Provisioning with the service role key: creates the administrator unless
/// it already exists.
#[derive(Debug, Clone)]
pub struct AdminSeeder {
    client: SupabaseClient,
    database: Database,
}

impl AdminSeeder {
    pub fn new(service_client: SupabaseClient) -> Self {
        Self {
            database: Database::new(service_client.clone()),
            client: service_client,
        }
    }

    async fn list_users(&self) -> Result<Vec<AuthUser>, ServiceError> {
        let response = self
            .client
            .request(Method::GET, "/auth/v1/admin/users")
            .query(&[("page", "1"), ("per_page", "1000")])
            .send()
            .await?;

        let list: UserList = read_json(response, ServiceError::from_auth).await?;
        Ok(list.users)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, ServiceError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/admin/users")
            .json(&NewUser {
                email,
                password,
                email_confirm: true,
            })
            .send()
            .await?;

        // Older auth servers wrap the created user in `{ "user": ... }`
        let body: Value = read_json(response, ServiceError::from_auth).await?;
        let user = body.get("user").cloned().unwrap_or(body);
        serde_json::from_value(user).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    /// Idempotent: an existing account with `email` is reported, not recreated.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<SeedOutcome, ServiceError> {
        let exists = self
            .list_users()
            .await?
            .iter()
            .any(|user| user.email.as_deref() == Some(email));

        if exists {
            info!("Admin user {} already exists", email);
            return Ok(SeedOutcome {
                created: false,
                message: "Admin user already exists".to_string(),
                user_id: None,
            });
        }

        let user = self.create_user(email, password).await?;
        self.database.grant_role(&user.id, ADMIN_ROLE).await?;
        info!("Created admin user {} ({})", email, user.id);

        Ok(SeedOutcome {
            created: true,
            message: "Admin user created successfully".to_string(),
            user_id: Some(user.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn auth(server: &MockServer) -> Auth {
        Auth::new(SupabaseClient::new(&server.uri(), "anon-key"), "@admin.local")
    }

    // ==================== Sign In ====================

    #[test]
    fn test_email_for_username() {
        let auth = Auth::new(SupabaseClient::new("http://localhost", "k"), "@admin.local");
        assert_eq!(auth.email_for("admin"), "admin@admin.local");
        assert_eq!(auth.email_for("  editor "), "editor@admin.local");
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({ "email": "admin@admin.local", "password": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": { "id": "u1", "email": "admin@admin.local" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = auth(&server).sign_in("admin", "secret").await.unwrap();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user.id, "u1");
    }

    #[tokio::test]
    async fn test_sign_in_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = auth(&server).sign_in("admin", "wrong").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
        assert_eq!(err.user_message(), "Invalid username or password");
    }

    #[tokio::test]
    async fn test_sign_in_other_error_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "code": 429,
                "msg": "Request rate limit reached"
            })))
            .mount(&server)
            .await;

        let err = auth(&server).sign_in("admin", "x").await.unwrap_err();
        assert_eq!(err.user_message(), "Request rate limit reached");
    }

    #[tokio::test]
    async fn test_user_for_expired_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("Authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "invalid JWT" })))
            .mount(&server)
            .await;

        let err = auth(&server).user_for_token("stale").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    // ==================== Seeding ====================

    #[tokio::test]
    async fn test_seed_creates_user_and_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/admin/users"))
            .and(header("Authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/admin/users"))
            .and(body_json(json!({
                "email": "admin@admin.local",
                "password": "admin",
                "email_confirm": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "new-id",
                "email": "admin@admin.local"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/user_roles"))
            .and(body_json(json!({ "user_id": "new-id", "role": "admin" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let seeder = AdminSeeder::new(SupabaseClient::new(&server.uri(), "service-key"));
        let outcome = seeder.seed_admin("admin@admin.local", "admin").await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.user_id.as_deref(), Some("new-id"));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [ { "id": "existing", "email": "admin@admin.local" } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let seeder = AdminSeeder::new(SupabaseClient::new(&server.uri(), "service-key"));
        let outcome = seeder.seed_admin("admin@admin.local", "admin").await.unwrap();

        assert!(!outcome.created);
        assert!(outcome.message.contains("already exists"));
    }

    #[tokio::test]
    async fn test_create_user_accepts_wrapped_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "id": "wrapped", "email": "a@admin.local" }
            })))
            .mount(&server)
            .await;

        let seeder = AdminSeeder::new(SupabaseClient::new(&server.uri(), "service-key"));
        let user = seeder.create_user("a@admin.local", "pw").await.unwrap();
        assert_eq!(user.id, "wrapped");
    }
}
