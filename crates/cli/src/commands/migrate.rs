//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tamarind-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `TAMARIND_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use tracing::info;

use tamarind_api::db;

/// Run all pending migrations against the configured database.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}

/// Resolve the database URL, preferring the app-specific variable.
pub(crate) fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    std::env::var("TAMARIND_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "TAMARIND_DATABASE_URL not set".into())
}
