//! CLI command implementations.

pub mod content;
pub mod migrate;
pub mod subscribers;

use comingsoon_site::config::{ConfigError, MaintenanceConfig};
use comingsoon_site::db::{self, PgStore};

/// Connect to the site database.
async fn connect() -> Result<(MaintenanceConfig, PgStore), ConnectError> {
    let config = MaintenanceConfig::from_env()?;
    tracing::info!(site_id = %config.site_id, "Connecting to site database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, PgStore::new(pool)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
