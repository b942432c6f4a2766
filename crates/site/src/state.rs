//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::{ContentRepository, SubscriberRepository};
use crate::services::{ContentService, SubscriptionRegister};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The pool is only present when the site runs
/// against `PostgreSQL`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: Option<PgPool>,
    register: SubscriptionRegister,
    content: ContentService,
}

impl AppState {
    /// Create application state over the given repositories.
    #[must_use]
    pub fn new(
        config: SiteConfig,
        pool: Option<PgPool>,
        subscribers: Arc<dyn SubscriberRepository>,
        content: Arc<dyn ContentRepository>,
    ) -> Self {
        let register = SubscriptionRegister::new(config.site_id.clone(), subscribers);
        let content = ContentService::new(config.site_id.clone(), content, config.content_max_bytes);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                register,
                content,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// The database pool, when running against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn register(&self) -> &SubscriptionRegister {
        &self.inner.register
    }

    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }
}
