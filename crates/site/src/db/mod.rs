//! Storage for page content and subscribers.
//!
//! # Tables
//!
//! - `site_content` - One JSONB content document per site
//! - `route_seo` - Per-path SEO overrides (JSONB)
//! - `subscribers` - One row per (site, normalized email)
//!
//! Both backends implement the same repository traits: [`PgStore`] for
//! deployments and [`MemoryStore`] for local runs and tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p comingsoon-cli -- migrate
//! ```

pub mod content;
pub mod memory;
pub mod subscribers;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comingsoon_core::{SiteId, SubscriberId};
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::{NewSubscriber, Subscriber};

pub use memory::MemoryStore;

/// Channel notified by the `subscribers` table trigger. The payload is the
/// site id of the changed row.
pub const SUBSCRIBERS_CHANNEL: &str = "subscribers_changed";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Result of a check-then-write insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Subscriber),
    AlreadyExists,
}

/// A stored content document with its server-set timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub document: Value,
    pub updated_at: DateTime<Utc>,
}

/// Subscriber persistence.
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Insert unless a record with the same id exists for the site.
    ///
    /// The existence check and the write are atomic: of any number of
    /// concurrent calls for one id, exactly one returns `Inserted`.
    async fn insert_if_absent(
        &self,
        site_id: &SiteId,
        subscriber: &NewSubscriber,
    ) -> Result<InsertOutcome, RepositoryError>;

    /// All subscribers of a site, newest first.
    async fn list(&self, site_id: &SiteId) -> Result<Vec<Subscriber>, RepositoryError>;

    /// Remove one subscriber. Returns whether a record existed.
    async fn delete(&self, site_id: &SiteId, id: &SubscriberId) -> Result<bool, RepositoryError>;
}

/// Content document and route SEO persistence.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// The site's document, if one was ever saved.
    async fn fetch(&self, site_id: &SiteId) -> Result<Option<StoredDocument>, RepositoryError>;

    /// Overwrite the site's document. Returns the new timestamp.
    async fn upsert(
        &self,
        site_id: &SiteId,
        document: &Value,
    ) -> Result<DateTime<Utc>, RepositoryError>;

    /// The SEO override stored for a path key.
    async fn fetch_route_seo(
        &self,
        site_id: &SiteId,
        path_key: &str,
    ) -> Result<Option<Value>, RepositoryError>;

    /// Overwrite the SEO override for a path key.
    async fn upsert_route_seo(
        &self,
        site_id: &SiteId,
        path_key: &str,
        seo: &Value,
    ) -> Result<(), RepositoryError>;
}

/// Repositories backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
