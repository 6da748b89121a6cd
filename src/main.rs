use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vet_clinic::{
    api::{self, AppState},
    config::{database, seed, settings::Settings},
    errors::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the real environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Server and auth settings
    let settings = Settings::from_env().inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Bootstrap admin account and service catalogue on a fresh database
    let seed_config = seed::load_seed_config(&settings.seed_path)?;
    seed::apply_seed(&db, &seed_config, &settings.auth)
        .await
        .inspect_err(|e| error!("Failed to apply seed data: {e}"))?;

    // 6. Serve the API until shutdown
    api::serve(AppState::new(db, settings.auth), settings.port).await
}
