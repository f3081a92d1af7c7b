use dotenvy::dotenv;
use schedule_buddy::{api, config, errors::Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::settings::load_default_config()?;
    info!("configuration loaded, database at {}", app_config.database_url);

    // 4. Initialize database and schema
    let db = config::database::create_connection(&app_config.database_url).await?;
    config::database::create_tables(&db).await?;
    info!("database initialized");

    // 5. Serve the API
    api::serve(&app_config.bind_address, db).await
}
