use anyhow::{Context, Result};
use interline_web::{auth::AdminSeeder, config::Config, supabase::SupabaseClient};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seed_admin=info".parse()?)
                .add_directive("interline_web=info".parse()?),
        )
        .init();

    info!("Provisioning the admin account");

    // Load config from environment
    let config = Config::from_env()?;

    let client = SupabaseClient::service_role(&config)
        .context("SUPABASE_SERVICE_ROLE_KEY must be set to create users")?;
    let password = config
        .admin_password
        .as_deref()
        .context("ADMIN_PASSWORD must be set")?;
    let email = config.admin_email(&config.admin_username);

    let outcome = AdminSeeder::new(client)
        .seed_admin(&email, password)
        .await
        .context("Failed to seed admin user")?;

    info!("✓ {} ({})", outcome.message, email);
    Ok(())
}
