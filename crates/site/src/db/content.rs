//! Content document and route SEO storage for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comingsoon_core::SiteId;
use serde_json::Value;

use super::{ContentRepository, PgStore, RepositoryError, StoredDocument};

#[async_trait]
impl ContentRepository for PgStore {
    async fn fetch(&self, site_id: &SiteId) -> Result<Option<StoredDocument>, RepositoryError> {
        let row: Option<(Value, DateTime<Utc>)> = sqlx::query_as(
            r"
            SELECT document, updated_at FROM site_content
            WHERE site_id = $1
            ",
        )
        .bind(site_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|(document, updated_at)| StoredDocument {
            document,
            updated_at,
        }))
    }

    async fn upsert(
        &self,
        site_id: &SiteId,
        document: &Value,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        let updated_at: DateTime<Utc> = sqlx::query_scalar(
            r"
            INSERT INTO site_content (site_id, document, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (site_id) DO UPDATE
                SET document = EXCLUDED.document, updated_at = NOW()
            RETURNING updated_at
            ",
        )
        .bind(site_id)
        .bind(document)
        .fetch_one(self.pool())
        .await?;

        Ok(updated_at)
    }

    async fn fetch_route_seo(
        &self,
        site_id: &SiteId,
        path_key: &str,
    ) -> Result<Option<Value>, RepositoryError> {
        let seo: Option<Value> = sqlx::query_scalar(
            r"
            SELECT seo FROM route_seo
            WHERE site_id = $1 AND path_key = $2
            ",
        )
        .bind(site_id)
        .bind(path_key)
        .fetch_optional(self.pool())
        .await?;

        Ok(seo)
    }

    async fn upsert_route_seo(
        &self,
        site_id: &SiteId,
        path_key: &str,
        seo: &Value,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO route_seo (site_id, path_key, seo, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (site_id, path_key) DO UPDATE
                SET seo = EXCLUDED.seo, updated_at = NOW()
            ",
        )
        .bind(site_id)
        .bind(path_key)
        .bind(seo)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
