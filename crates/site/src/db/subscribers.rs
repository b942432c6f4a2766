//! Subscriber repository for `PostgreSQL`.
//!
//! Queries are checked at runtime; see `migrations/` for the schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comingsoon_core::{Email, Phone, SiteId, SubscriberId};

use super::{InsertOutcome, PgStore, RepositoryError, SubscriberRepository};
use crate::models::{NewSubscriber, Subscriber};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SubscriberRow {
    id: String,
    site_id: String,
    name: String,
    email: String,
    phone: Option<String>,
    subscribed_at: DateTime<Utc>,
}

impl TryFrom<SubscriberRow> for Subscriber {
    type Error = RepositoryError;

    fn try_from(row: SubscriberRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = row
            .phone
            .filter(|p| !p.trim().is_empty())
            .map(|p| Phone::parse(&p))
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;
        let site_id = SiteId::parse(&row.site_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid site id in database: {e}"))
        })?;

        Ok(Self {
            id: SubscriberId::from_raw(row.id),
            site_id,
            name: row.name,
            email,
            phone,
            subscribed_at: row.subscribed_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl SubscriberRepository for PgStore {
    async fn insert_if_absent(
        &self,
        site_id: &SiteId,
        subscriber: &NewSubscriber,
    ) -> Result<InsertOutcome, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        let existing: Option<(String,)> = sqlx::query_as(
            r"
            SELECT id FROM subscribers
            WHERE site_id = $1 AND id = $2
            FOR UPDATE
            ",
        )
        .bind(site_id)
        .bind(&subscriber.id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            tx.rollback().await?;
            return Ok(InsertOutcome::AlreadyExists);
        }

        let inserted = sqlx::query_as::<_, SubscriberRow>(
            r"
            INSERT INTO subscribers (site_id, id, name, email, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, site_id, name, email, phone, subscribed_at
            ",
        )
        .bind(site_id)
        .bind(&subscriber.id)
        .bind(&subscriber.name)
        .bind(&subscriber.email)
        .bind(subscriber.phone.as_ref().map(Phone::as_str))
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            // A concurrent transaction inserted the same id after our probe.
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                return Ok(InsertOutcome::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(InsertOutcome::Inserted(row.try_into()?))
    }

    async fn list(&self, site_id: &SiteId) -> Result<Vec<Subscriber>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            r"
            SELECT id, site_id, name, email, phone, subscribed_at
            FROM subscribers
            WHERE site_id = $1
            ORDER BY subscribed_at DESC, seq DESC
            ",
        )
        .bind(site_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, site_id: &SiteId, id: &SubscriberId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM subscribers
            WHERE site_id = $1 AND id = $2
            ",
        )
        .bind(site_id)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
