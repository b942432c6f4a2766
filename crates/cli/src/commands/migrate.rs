//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cs-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Site migrations: `crates/site/migrations/`

use super::{ConnectError, connect};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run site database migrations.
pub async fn run() -> Result<(), MigrationError> {
    let (_, store) = connect().await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(store.pool()).await?;

    tracing::info!("Site migrations complete!");
    Ok(())
}
