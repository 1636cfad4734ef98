//! Database migration command.
//!
//! ```bash
//! medicart migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MEDICART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server crate.

use medicart_server::config::get_database_url;
use medicart_server::db;

use super::CliError;

/// Apply pending server migrations.
pub async fn run() -> Result<String, CliError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("MEDICART_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(format!(
        "Database schema is up to date ({} migrations).",
        db::MIGRATOR.iter().count()
    ))
}
