use anyhow::{Context, Result};
use interline_web::config::Config;
use interline_web::i18n::{CatalogValidator, UiStrings};
use interline_web::server::{create_router, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("interline_web=info".parse()?),
        )
        .init();

    info!("Starting Interline web server");

    // Load configuration from environment
    let config = Config::from_env()?;

    // A gap in the catalog only degrades to English, so it is not fatal
    let report = CatalogValidator::validate(UiStrings::global());
    for warning in &report.warnings {
        warn!("UI strings: {}", warning);
    }
    for error in &report.errors {
        warn!("UI strings: {}", error);
    }

    if config.supabase_service_role_key.is_none() {
        warn!("SUPABASE_SERVICE_ROLE_KEY not set, /api/admin/seed is disabled");
    }
    if config.api_key.is_none() {
        warn!("API_KEY not set, /api/admin/seed rejects every request");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let app = create_router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
