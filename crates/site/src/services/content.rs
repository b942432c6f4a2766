//! Page content loading and saving.
//!
//! Loads merge the stored document onto the built-in defaults; saves
//! sanitize the submitted payload, enforce the size ceiling and only then
//! write. Loaded content and route SEO overrides are cached with `moka`
//! (1 minute TTL) and replaced in place after a save.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use comingsoon_core::SiteId;
use comingsoon_core::content::{self, DocumentTooLarge, PageContent};
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::db::{ContentRepository, RepositoryError};
use crate::seo::SeoOverride;

const CONTENT_KEY: &str = "content";

/// Errors from content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The sanitized document is over the size ceiling; nothing was written.
    #[error(transparent)]
    TooLarge(#[from] DocumentTooLarge),

    /// A route SEO payload was not a JSON object.
    #[error("invalid SEO override: {0}")]
    InvalidSeo(String),

    /// The document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Where loaded content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Merged from a stored document.
    Stored,
    /// Nothing stored yet; built-in defaults.
    Defaults,
}

/// Content as served, with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedContent {
    pub content: PageContent,
    pub source: ContentSource,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
enum CacheValue {
    Content(Arc<LoadedContent>),
    RouteSeo(Option<Arc<SeoOverride>>),
}

/// Loads and saves the page content of one site.
#[derive(Clone)]
pub struct ContentService {
    inner: Arc<ContentServiceInner>,
}

struct ContentServiceInner {
    site_id: SiteId,
    repo: Arc<dyn ContentRepository>,
    max_bytes: usize,
    cache: Cache<String, CacheValue>,
}

impl ContentService {
    #[must_use]
    pub fn new(site_id: SiteId, repo: Arc<dyn ContentRepository>, max_bytes: usize) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(60))
            .build();

        Self {
            inner: Arc::new(ContentServiceInner {
                site_id,
                repo,
                max_bytes,
                cache,
            }),
        }
    }

    /// The size ceiling applied on save.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.inner.max_bytes
    }

    /// Read the stored document and merge it onto the defaults, bypassing
    /// the cache.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Repository` when the store fails.
    #[instrument(skip(self), fields(site_id = %self.inner.site_id))]
    pub async fn load(&self) -> Result<LoadedContent, ContentError> {
        let defaults = PageContent::defaults();
        let loaded = match self.inner.repo.fetch(&self.inner.site_id).await? {
            Some(stored) => LoadedContent {
                content: content::merge_stored(&stored.document, &defaults),
                source: ContentSource::Stored,
                updated_at: Some(stored.updated_at),
            },
            None => {
                debug!("No stored content, using defaults");
                LoadedContent {
                    content: defaults,
                    source: ContentSource::Defaults,
                    updated_at: None,
                }
            }
        };
        Ok(loaded)
    }

    /// The current content, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Repository` when the store fails on a miss.
    pub async fn current(&self) -> Result<Arc<LoadedContent>, ContentError> {
        if let Some(CacheValue::Content(loaded)) = self.inner.cache.get(CONTENT_KEY).await {
            debug!("Cache hit for content");
            return Ok(loaded);
        }

        let loaded = Arc::new(self.load().await?);
        self.inner
            .cache
            .insert(CONTENT_KEY.to_owned(), CacheValue::Content(Arc::clone(&loaded)))
            .await;
        Ok(loaded)
    }

    /// Sanitize and store a submitted document.
    ///
    /// Fields missing from `payload` keep their current values. The cached
    /// content is replaced with exactly what was written.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::TooLarge` without writing when the sanitized
    /// document is over the ceiling, and `ContentError::Repository` when the
    /// store fails.
    #[instrument(skip(self, payload), fields(site_id = %self.inner.site_id))]
    pub async fn save(&self, payload: &Value) -> Result<LoadedContent, ContentError> {
        let current = self.current().await?;
        let sanitized = content::sanitize(payload, &current.content);

        let size = content::check_size(&sanitized, self.inner.max_bytes).map_err(|e| {
            tracing::warn!(size = e.size, limit = e.limit, "Content over size ceiling");
            e
        })?;

        let document = serde_json::to_value(&sanitized)?;
        let updated_at = self
            .inner
            .repo
            .upsert(&self.inner.site_id, &document)
            .await?;
        tracing::info!(size, "Content saved");

        let saved = LoadedContent {
            content: sanitized,
            source: ContentSource::Stored,
            updated_at: Some(updated_at),
        };
        self.inner
            .cache
            .insert(
                CONTENT_KEY.to_owned(),
                CacheValue::Content(Arc::new(saved.clone())),
            )
            .await;
        Ok(saved)
    }

    /// The SEO override stored for a path key, if any.
    ///
    /// Stored values that are not objects are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Repository` when the store fails on a miss.
    pub async fn route_seo(&self, path_key: &str) -> Result<Option<Arc<SeoOverride>>, ContentError> {
        let cache_key = format!("seo:{path_key}");
        if let Some(CacheValue::RouteSeo(seo)) = self.inner.cache.get(&cache_key).await {
            return Ok(seo);
        }

        let seo = self
            .inner
            .repo
            .fetch_route_seo(&self.inner.site_id, path_key)
            .await?
            .as_ref()
            .and_then(SeoOverride::from_value)
            .filter(|seo| !seo.is_empty())
            .map(Arc::new);
        self.inner
            .cache
            .insert(cache_key, CacheValue::RouteSeo(seo.clone()))
            .await;
        Ok(seo)
    }

    /// Store the SEO override for a path key. Only non-blank string fields
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidSeo` when `payload` is not an object,
    /// and `ContentError::Repository` when the store fails.
    #[instrument(skip(self, payload), fields(site_id = %self.inner.site_id))]
    pub async fn save_route_seo(
        &self,
        path_key: &str,
        payload: &Value,
    ) -> Result<SeoOverride, ContentError> {
        let seo = SeoOverride::from_value(payload)
            .ok_or_else(|| ContentError::InvalidSeo("expected a JSON object".to_owned()))?;

        self.inner
            .repo
            .upsert_route_seo(&self.inner.site_id, path_key, &serde_json::to_value(&seo)?)
            .await?;
        tracing::info!(path_key, "Route SEO saved");

        let cached = Some(Arc::new(seo.clone())).filter(|seo| !seo.is_empty());
        self.inner
            .cache
            .insert(format!("seo:{path_key}"), CacheValue::RouteSeo(cached))
            .await;
        Ok(seo)
    }
}
