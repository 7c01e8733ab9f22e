use crate::error::ServiceError;
use crate::posts::{Post, PostDraft, PostQuery, ADMIN_ORDER};
use crate::settings::{SettingsUpdate, SiteSettings};
use crate::supabase::{check_status, read_json, SupabaseClient, SINGLE_OBJECT};
use reqwest::{header::ACCEPT, Method};
use serde::Serialize;
use tracing::{debug, info};

const POSTS: &str = "/rest/v1/posts";
const SITE_SETTINGS: &str = "/rest/v1/site_settings";
const USER_ROLES: &str = "/rest/v1/user_roles";

/// Table access over PostgREST. Row-level security decides what the
/// underlying key or user token may see and change.
#[derive(Debug, Clone)]
pub struct Database {
    client: SupabaseClient,
}

#[derive(Debug, Serialize)]
struct GalleryPatch<'a> {
    gallery: &'a [String],
}

#[derive(Debug, Serialize)]
struct UserRole<'a> {
    user_id: &'a str,
    role: &'a str,
}

impl Database {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Same tables, accessed as the user holding `token`.
    pub fn with_token(&self, token: &str) -> Self {
        Self::new(self.client.with_token(token))
    }

    // ==================== Posts ====================

    /// Published posts matching `query`, in public display order.
    pub async fn published_posts(&self, query: &PostQuery) -> Result<Vec<Post>, ServiceError> {
        let response = self
            .client
            .request(Method::GET, POSTS)
            .query(&query.to_params())
            .send()
            .await?;

        let posts: Vec<Post> = read_json(response, postgrest_error(None)).await?;
        debug!("Fetched {} published posts", posts.len());
        Ok(posts)
    }

    /// A published post by slug, or `None` if there is no such post.
    pub async fn published_post_by_slug(&self, slug: &str) -> Result<Option<Post>, ServiceError> {
        let response = self
            .client
            .request(Method::GET, POSTS)
            .query(&[
                ("select", "*".to_string()),
                ("slug", format!("eq.{}", slug)),
                ("is_published", "eq.true".to_string()),
            ])
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        match read_json(response, postgrest_error(None)).await {
            Ok(post) => Ok(Some(post)),
            Err(ServiceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Every post including drafts, most recently edited first.
    pub async fn all_posts(&self) -> Result<Vec<Post>, ServiceError> {
        let response = self
            .client
            .request(Method::GET, POSTS)
            .query(&[("select", "*"), ("order", ADMIN_ORDER)])
            .send()
            .await?;

        read_json(response, postgrest_error(None)).await
    }

    pub async fn post_by_id(&self, id: &str) -> Result<Post, ServiceError> {
        let response = self
            .client
            .request(Method::GET, POSTS)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        read_json(response, postgrest_error(None))
            .await
            .map_err(not_found_as("post"))
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, ServiceError> {
        let response = self
            .client
            .request(Method::POST, POSTS)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(draft)
            .send()
            .await?;

        let post: Post = read_json(response, postgrest_error(Some(&draft.slug))).await?;
        info!("Created post {} ({})", post.slug, post.id);
        Ok(post)
    }

    pub async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<Post, ServiceError> {
        self.patch_post(id, draft, Some(&draft.slug)).await
    }

    /// Replace only the gallery of a post.
    pub async fn update_gallery(&self, id: &str, gallery: &[String]) -> Result<Post, ServiceError> {
        self.patch_post(id, &GalleryPatch { gallery }, None).await
    }

    async fn patch_post<T: Serialize>(
        &self,
        id: &str,
        body: &T,
        slug: Option<&str>,
    ) -> Result<Post, ServiceError> {
        let response = self
            .client
            .request(Method::PATCH, POSTS)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(body)
            .send()
            .await?;

        let post: Post = read_json(response, postgrest_error(slug))
            .await
            .map_err(not_found_as("post"))?;
        info!("Updated post {} ({})", post.slug, post.id);
        Ok(post)
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .request(Method::DELETE, POSTS)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        check_status(response, postgrest_error(None)).await?;
        info!("Deleted post {}", id);
        Ok(())
    }

    // ==================== Site Settings ====================

    /// The settings row, if one exists.
    pub async fn site_settings(&self) -> Result<Option<SiteSettings>, ServiceError> {
        let response = self
            .client
            .request(Method::GET, SITE_SETTINGS)
            .query(&[("select", "*"), ("limit", "1")])
            .send()
            .await?;

        let rows: Vec<SiteSettings> = read_json(response, postgrest_error(None)).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn update_settings(
        &self,
        id: &str,
        update: &SettingsUpdate,
    ) -> Result<SiteSettings, ServiceError> {
        let response = self
            .client
            .request(Method::PATCH, SITE_SETTINGS)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(update)
            .send()
            .await?;

        let settings = read_json(response, postgrest_error(None))
            .await
            .map_err(not_found_as("settings"))?;
        info!("Updated site settings {}", id);
        Ok(settings)
    }

    // ==================== Roles ====================

    pub async fn grant_role(&self, user_id: &str, role: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .request(Method::POST, USER_ROLES)
            .json(&UserRole { user_id, role })
            .send()
            .await?;

        check_status(response, postgrest_error(None)).await?;
        info!("Granted role '{}' to user {}", role, user_id);
        Ok(())
    }

    /// Whether a `user_roles` row grants `role` to `user_id`.
    pub async fn has_role(&self, user_id: &str, role: &str) -> Result<bool, ServiceError> {
        let response = self
            .client
            .request(Method::GET, USER_ROLES)
            .query(&[
                ("select", "role".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("role", format!("eq.{}", role)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = read_json(response, postgrest_error(None)).await?;
        Ok(!rows.is_empty())
    }
}

fn postgrest_error(slug: Option<&str>) -> impl FnOnce(u16, &str) -> ServiceError + '_ {
    move |status, body| ServiceError::from_postgrest(status, body, slug)
}

fn not_found_as(what: &'static str) -> impl Fn(ServiceError) -> ServiceError {
    move |err| match err {
        ServiceError::NotFound(_) => ServiceError::NotFound(what.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::DisplayLocation;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn post_json(slug: &str) -> serde_json::Value {
        json!({
            "id": format!("id-{}", slug),
            "slug": slug,
            "category": "offer",
            "is_published": true,
            "gallery": ["https://cdn/a.jpg"],
            "title_ka": "", "title_ru": "", "title_en": slug,
            "excerpt_ka": "", "excerpt_ru": "", "excerpt_en": "",
            "content_ka": "", "content_ru": "", "content_en": "",
            "display_locations": ["offers_page", "home_latest"],
            "sort_order": 1,
            "pinned": true,
            "featured": false,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    async fn setup() -> (MockServer, Database) {
        let server = MockServer::start().await;
        let db = Database::new(SupabaseClient::new(&server.uri(), "anon-key"));
        (server, db)
    }

    // ==================== Posts ====================

    #[tokio::test]
    async fn test_home_latest_query() {
        let (server, db) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("is_published", "eq.true"))
            .and(query_param("display_locations", "cs.{home_latest}"))
            .and(query_param(
                "order",
                "pinned.desc,sort_order.asc.nullslast,created_at.desc",
            ))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json("a")])))
            .expect(1)
            .mount(&server)
            .await;

        let posts = db.published_posts(&PostQuery::home_latest(3)).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].display_locations.contains(&DisplayLocation::HomeLatest));
    }

    #[tokio::test]
    async fn test_missing_slug_is_none() {
        let (server, db) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("slug", "eq.missing"))
            .and(header("Accept", SINGLE_OBJECT))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({
                "code": "PGRST116",
                "details": "The result contains 0 rows",
                "message": "JSON object requested, multiple (or no) rows returned"
            })))
            .mount(&server)
            .await;

        assert_eq!(db.published_post_by_slug("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_post_by_id_not_found() {
        let (server, db) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({ "code": "PGRST116" })))
            .mount(&server)
            .await;

        let err = db.post_by_id("nope").await.unwrap_err();
        assert_eq!(err.user_message(), "Post not found");
    }

    #[tokio::test]
    async fn test_create_duplicate_slug() {
        let (server, db) = setup().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/posts"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"posts_slug_key\""
            })))
            .mount(&server)
            .await;

        let draft = PostDraft {
            slug: "summer".to_string(),
            title_en: "Summer".to_string(),
            ..Default::default()
        };
        let err = db.create_post(&draft).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateSlug(ref slug) if slug == "summer"));
        assert_eq!(err.user_message(), "A post with this slug already exists");
    }

    #[tokio::test]
    async fn test_update_gallery_sends_only_gallery() {
        let (server, db) = setup().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/posts"))
            .and(query_param("id", "eq.id-a"))
            .and(body_json(json!({ "gallery": ["https://cdn/b.jpg", "https://cdn/a.jpg"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json("a")))
            .expect(1)
            .mount(&server)
            .await;

        let gallery = vec!["https://cdn/b.jpg".to_string(), "https://cdn/a.jpg".to_string()];
        db.update_gallery("id-a", &gallery).await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_listing_uses_token_and_order() {
        let (server, db) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("order", "updated_at.desc"))
            .and(header("Authorization", "Bearer admin-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json("a"), post_json("b")])))
            .expect(1)
            .mount(&server)
            .await;

        let posts = db.with_token("admin-jwt").all_posts().await.unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_post() {
        let (server, db) = setup().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/posts"))
            .and(query_param("id", "eq.id-a"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        db.delete_post("id-a").await.unwrap();
    }

    // ==================== Settings ====================

    #[tokio::test]
    async fn test_site_settings_absent() {
        let (server, db) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/site_settings"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(db.site_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_settings_content_only() {
        let (server, db) = setup().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/site_settings"))
            .and(query_param("id", "eq.s1"))
            .and(body_json(json!({ "site_content": { "home": { "heroTitle": { "en": "Hi" } } } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "s1",
                "site_content": { "home": { "heroTitle": { "en": "Hi" } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let update = SettingsUpdate::content(json!({ "home": { "heroTitle": { "en": "Hi" } } }));
        let settings = db.update_settings("s1", &update).await.unwrap();
        assert_eq!(settings.id, "s1");
    }

    // ==================== Roles ====================

    #[tokio::test]
    async fn test_has_role() {
        let (server, db) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .and(query_param("user_id", "eq.admin-id"))
            .and(query_param("role", "eq.admin"))
            .and(header("Authorization", "Bearer admin-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "role": "admin" }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .and(query_param("user_id", "eq.editor-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let db = db.with_token("admin-jwt");
        assert!(db.has_role("admin-id", "admin").await.unwrap());
        assert!(!db.has_role("editor-id", "admin").await.unwrap());
    }
}
