//! HTTP surface: locale-prefixed public pages and the admin API.
//!
//! Public pages are served as JSON view models under `/{locale}/...`.
//! Everything under `/api/admin` except `login` and `seed` needs a
//! `Bearer` session token issued by the auth service, held by a user with
//! the `admin` role.

use crate::auth::{AdminSeeder, Auth, AuthUser, SeedOutcome, Session, ADMIN_ROLE};
use crate::blocks::{block_root, list_limit, with_fresh_id};
use crate::config::Config;
use crate::db::Database;
use crate::error::ServiceError;
use crate::i18n::Locale;
use crate::list_editor::ListEdit;
use crate::pages::{
    about_page, build_layout, contacts_page, default_block, home_page, offer_detail_page,
    offers_page, services_page, AboutPage, ContactsPage, HomePage, OfferDetailPage, OffersPage,
    PageView, RenderContext, ServicesPage, HOME_LATEST_LIMIT,
};
use crate::posts::{search_by_title, OfferTab, Post, PostDraft, PostQuery};
use crate::routing::locale_redirect;
use crate::security::{api_key_matches, bearer_token};
use crate::settings::{SettingsUpdate, SiteSettings};
use crate::storage::{Storage, UploadFolder, MAX_UPLOAD_BYTES};
use crate::supabase::SupabaseClient;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Database,
    pub storage: Storage,
    pub auth: Auth,
    /// Present only when a service role key is configured.
    pub seeder: Option<AdminSeeder>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let client = SupabaseClient::from_config(&config);
        Self {
            database: Database::new(client.clone()),
            storage: Storage::new(client.clone(), &config.storage_bucket),
            auth: Auth::new(client, &config.admin_email_domain),
            seeder: SupabaseClient::service_role(&config).map(AdminSeeder::new),
            config: Arc::new(config),
        }
    }
}

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ServiceError>;

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        // Posts
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).put(update_post).delete(delete_post))
        .route("/posts/:id/gallery", patch(edit_gallery))
        // Site settings
        .route("/settings", get(get_settings).put(update_settings))
        .route("/settings/blocks", patch(edit_block))
        // Images; the size check itself happens in the storage layer
        .route(
            "/uploads",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session))
        // No session required
        .route("/login", post(login))
        .route("/seed", post(seed_admin));

    let page_routes = Router::new()
        .route("/:locale", get(home))
        .route("/:locale/offers", get(offers))
        .route("/:locale/offers/:slug", get(offer_detail))
        .route("/:locale/about", get(about))
        .route("/:locale/services", get(services))
        .route("/:locale/contacts", get(contacts));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api/admin", admin_routes)
        .merge(page_routes)
        .merge(health_routes)
        .fallback(not_found)
        .layer(middleware::from_fn(locale_redirect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> ServiceError {
    ServiceError::NotFound("page".to_string())
}

// ==================== Public Pages ====================

#[derive(Debug, Default, Deserialize)]
pub struct OffersParams {
    pub tab: Option<String>,
    pub q: Option<String>,
}

struct PageRequest {
    ctx: RenderContext,
    settings: Option<SiteSettings>,
    uri: Uri,
}

impl PageRequest {
    async fn load(
        state: &AppState,
        locale: &str,
        uri: Uri,
        headers: &HeaderMap,
    ) -> Result<Self, ServiceError> {
        let locale =
            Locale::from_segment(locale).ok_or_else(|| ServiceError::NotFound("page".to_string()))?;

        let session = match bearer_token(headers) {
            Some(token) => state.auth.user_for_token(token).await.ok(),
            None => None,
        };

        // Pages still render from defaults when settings are unavailable
        let settings = state.database.site_settings().await.unwrap_or_else(|e| {
            warn!("Failed to load site settings, using defaults: {}", e);
            None
        });

        Ok(Self {
            ctx: RenderContext::new(locale).with_session(session),
            settings,
            uri,
        })
    }

    fn render<T>(self, page: T) -> Json<PageView<T>> {
        Json(PageView {
            layout: build_layout(
                &self.ctx,
                self.settings.as_ref(),
                self.uri.path(),
                self.uri.query(),
            ),
            page,
        })
    }
}

/// GET /{locale}
async fn home(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<PageView<HomePage>>, ServiceError> {
    let request = PageRequest::load(&state, &locale, uri, &headers).await?;
    let latest = state
        .database
        .published_posts(&PostQuery::home_latest(HOME_LATEST_LIMIT))
        .await?;

    let page = home_page(&request.ctx, request.settings.as_ref(), &latest);
    Ok(request.render(page))
}

/// GET /{locale}/offers?tab=&q=
async fn offers(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    Query(params): Query<OffersParams>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<PageView<OffersPage>>, ServiceError> {
    let request = PageRequest::load(&state, &locale, uri, &headers).await?;
    let tab = OfferTab::from_param(params.tab.as_deref());
    let posts = state
        .database
        .published_posts(&PostQuery::for_tab(tab))
        .await?;
    let posts = search_by_title(posts, params.q.as_deref(), request.ctx.language);

    let page = offers_page(&request.ctx, tab, params.q.as_deref(), &posts);
    Ok(request.render(page))
}

/// GET /{locale}/offers/{slug}
async fn offer_detail(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<PageView<OfferDetailPage>>, ServiceError> {
    let request = PageRequest::load(&state, &locale, uri, &headers).await?;
    let post = state
        .database
        .published_post_by_slug(&slug)
        .await?
        .ok_or_else(|| ServiceError::NotFound("post".to_string()))?;

    let page = offer_detail_page(&request.ctx, request.settings.as_ref(), &post);
    Ok(request.render(page))
}

/// GET /{locale}/about
async fn about(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<PageView<AboutPage>>, ServiceError> {
    let request = PageRequest::load(&state, &locale, uri, &headers).await?;
    let page = about_page(&request.ctx, request.settings.as_ref());
    Ok(request.render(page))
}

/// GET /{locale}/services
async fn services(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<PageView<ServicesPage>>, ServiceError> {
    let request = PageRequest::load(&state, &locale, uri, &headers).await?;
    let page = services_page(&request.ctx, request.settings.as_ref());
    Ok(request.render(page))
}

/// GET /{locale}/contacts
async fn contacts(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<PageView<ContactsPage>>, ServiceError> {
    let request = PageRequest::load(&state, &locale, uri, &headers).await?;
    let page = contacts_page(&request.ctx, request.settings.as_ref());
    Ok(request.render(page))
}

// ==================== Admin Session ====================

/// The authenticated caller of an admin endpoint.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub user: AuthUser,
}

impl AdminSession {
    fn database(&self, state: &AppState) -> Database {
        state.database.with_token(&self.token)
    }
}

async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_string) else {
        return ServiceError::Unauthorized("missing bearer token".to_string()).into_response();
    };

    match admin_session(&state, token).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => {
            warn!("Rejected admin request: {}", e);
            e.into_response()
        }
    }
}

/// A valid session is not enough: the user must also hold the admin role.
async fn admin_session(state: &AppState, token: String) -> Result<AdminSession, ServiceError> {
    let user = state.auth.user_for_token(&token).await?;
    let is_admin = state
        .database
        .with_token(&token)
        .has_role(&user.id, ADMIN_ROLE)
        .await?;

    if !is_admin {
        return Err(ServiceError::Forbidden(format!(
            "user {} does not have the {} role",
            user.id, ADMIN_ROLE
        )));
    }
    Ok(AdminSession { token, user })
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/admin/login
async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<Session> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ServiceError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let session = state.auth.sign_in(&request.username, &request.password).await?;
    Ok(ApiResponse::new(session))
}

/// POST /api/admin/seed - needs `X-API-Key`, not a session.
async fn seed_admin(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SeedOutcome> {
    if !api_key_matches(&headers, state.config.api_key.as_deref()) {
        return Err(ServiceError::Unauthorized("invalid API key".to_string()));
    }

    let seeder = state.seeder.as_ref().ok_or_else(|| {
        ServiceError::Validation("SUPABASE_SERVICE_ROLE_KEY is not configured".to_string())
    })?;
    let password = state.config.admin_password.as_deref().ok_or_else(|| {
        ServiceError::Validation("ADMIN_PASSWORD is not configured".to_string())
    })?;

    let email = state.config.admin_email(&state.config.admin_username);
    let outcome = seeder.seed_admin(&email, password).await?;
    Ok(ApiResponse::new(outcome))
}

// ==================== Admin Posts ====================

/// GET /api/admin/posts
async fn list_posts(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<Vec<Post>> {
    let posts = session.database(&state).all_posts().await?;
    Ok(ApiResponse::new(posts))
}

/// GET /api/admin/posts/:id
async fn get_post(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> ApiResult<Post> {
    let post = session.database(&state).post_by_id(&id).await?;
    Ok(ApiResponse::new(post))
}

/// POST /api/admin/posts
async fn create_post(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, ApiResponse<Post>), ServiceError> {
    let mut draft = draft.prepare(true).map_err(ServiceError::Validation)?;
    draft.created_by = Some(session.user.id.clone());

    let post = session.database(&state).create_post(&draft).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(post)))
}

/// PUT /api/admin/posts/:id
async fn update_post(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    Json(draft): Json<PostDraft>,
) -> ApiResult<Post> {
    let draft = draft.prepare(false).map_err(ServiceError::Validation)?;
    let post = session.database(&state).update_post(&id, &draft).await?;
    Ok(ApiResponse::new(post))
}

/// DELETE /api/admin/posts/:id
async fn delete_post(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    session.database(&state).delete_post(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Either a single list edit or the full replacement gallery.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GalleryChange {
    Edit(ListEdit<String>),
    Replace { gallery: Vec<String> },
}

/// PATCH /api/admin/posts/:id/gallery
async fn edit_gallery(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    Json(change): Json<GalleryChange>,
) -> ApiResult<Post> {
    let database = session.database(&state);
    let post = database.post_by_id(&id).await?;

    let mut gallery = match change {
        GalleryChange::Edit(edit) => edit.apply(&post.gallery, None),
        GalleryChange::Replace { gallery } => gallery,
    };
    gallery.retain(|url| !url.trim().is_empty());

    let post = database.update_gallery(&id, &gallery).await?;
    Ok(ApiResponse::new(post))
}

// ==================== Admin Settings ====================

/// GET /api/admin/settings
async fn get_settings(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<SiteSettings> {
    let settings = current_settings(&session.database(&state)).await?;
    Ok(ApiResponse::new(settings))
}

/// PUT /api/admin/settings
async fn update_settings(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<SiteSettings> {
    let database = session.database(&state);
    let current = current_settings(&database).await?;
    let settings = database
        .update_settings(&current.id, &update.normalized())
        .await?;
    Ok(ApiResponse::new(settings))
}

/// One edit to a repeatable block list inside the content tree.
#[derive(Debug, Deserialize)]
pub struct BlockEdit {
    pub path: String,
    pub edit: ListEdit<Value>,
}

/// PATCH /api/admin/settings/blocks
///
/// Editing a list the tree does not hold yet starts from the built-in
/// defaults, so the first edit keeps what visitors already see. For lists
/// nested in a block item (service features and images) the whole
/// enclosing block is materialized first.
async fn edit_block(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Json(request): Json<BlockEdit>,
) -> ApiResult<SiteSettings> {
    let max_items = list_limit(&request.path).ok_or_else(|| {
        ServiceError::Validation(format!("'{}' is not an editable list", request.path))
    })?;

    let database = session.database(&state);
    let settings = current_settings(&database).await?;
    let mut content = settings.site_content.clone();

    let root = block_root(&request.path);
    if content.array(root).is_empty() {
        content
            .set(root, Value::Array(default_block(root)))
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
    }
    let items = content.array(&request.path);

    let edit = match request.edit {
        ListEdit::Append { item } => ListEdit::Append {
            item: with_fresh_id(item),
        },
        ListEdit::Replace { index, item } => ListEdit::Replace {
            index,
            item: with_fresh_id(item),
        },
        other => other,
    };
    let items = edit.apply(&items, max_items);

    content
        .set(&request.path, Value::Array(items))
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    let settings = database
        .update_settings(&settings.id, &SettingsUpdate::content(content.into_value()))
        .await?;

    info!("Edited block list {}", request.path);
    Ok(ApiResponse::new(settings))
}

async fn current_settings(database: &Database) -> Result<SiteSettings, ServiceError> {
    database
        .site_settings()
        .await?
        .ok_or_else(|| ServiceError::NotFound("settings".to_string()))
}

// ==================== Admin Uploads ====================

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub folder: UploadFolder,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub url: String,
}

/// POST /api/admin/uploads?folder=&file_name= with the raw image as body.
async fn upload_image(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<UploadedImage> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let url = state
        .storage
        .with_token(&session.token)
        .upload_image(params.folder, &params.file_name, content_type, body.to_vec())
        .await?;
    Ok(ApiResponse::new(UploadedImage { url }))
}
