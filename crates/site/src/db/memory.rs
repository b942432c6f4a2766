//! In-process store implementing the repository traits.
//!
//! One mutex guards all data; holding it across the existence check and the
//! insert gives the same at-most-one guarantee the database transaction
//! gives.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comingsoon_core::{SiteId, SubscriberId};
use serde_json::Value;
use tokio::sync::Mutex;

use super::{
    ContentRepository, InsertOutcome, RepositoryError, StoredDocument, SubscriberRepository,
};
use crate::models::{NewSubscriber, Subscriber};

#[derive(Default)]
struct Data {
    next_seq: u64,
    subscribers: HashMap<(SiteId, SubscriberId), (u64, Subscriber)>,
    documents: HashMap<SiteId, StoredDocument>,
    route_seo: HashMap<(SiteId, String), Value>,
}

/// Memory-backed subscriber and content storage.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberRepository for MemoryStore {
    async fn insert_if_absent(
        &self,
        site_id: &SiteId,
        subscriber: &NewSubscriber,
    ) -> Result<InsertOutcome, RepositoryError> {
        let mut data = self.data.lock().await;
        let key = (site_id.clone(), subscriber.id.clone());
        if data.subscribers.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        let record = Subscriber {
            id: subscriber.id.clone(),
            site_id: site_id.clone(),
            name: subscriber.name.clone(),
            email: subscriber.email.clone(),
            phone: subscriber.phone.clone(),
            subscribed_at: Utc::now(),
        };
        data.next_seq += 1;
        let seq = data.next_seq;
        data.subscribers.insert(key, (seq, record.clone()));
        Ok(InsertOutcome::Inserted(record))
    }

    async fn list(&self, site_id: &SiteId) -> Result<Vec<Subscriber>, RepositoryError> {
        let data = self.data.lock().await;
        let mut rows: Vec<&(u64, Subscriber)> = data
            .subscribers
            .iter()
            .filter(|((site, _), _)| site == site_id)
            .map(|(_, row)| row)
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.subscribed_at
                .cmp(&a.subscribed_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(rows.into_iter().map(|(_, s)| s.clone()).collect())
    }

    async fn delete(&self, site_id: &SiteId, id: &SubscriberId) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().await;
        Ok(data
            .subscribers
            .remove(&(site_id.clone(), id.clone()))
            .is_some())
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn fetch(&self, site_id: &SiteId) -> Result<Option<StoredDocument>, RepositoryError> {
        Ok(self.data.lock().await.documents.get(site_id).cloned())
    }

    async fn upsert(
        &self,
        site_id: &SiteId,
        document: &Value,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        let updated_at = Utc::now();
        self.data.lock().await.documents.insert(
            site_id.clone(),
            StoredDocument {
                document: document.clone(),
                updated_at,
            },
        );
        Ok(updated_at)
    }

    async fn fetch_route_seo(
        &self,
        site_id: &SiteId,
        path_key: &str,
    ) -> Result<Option<Value>, RepositoryError> {
        Ok(self
            .data
            .lock()
            .await
            .route_seo
            .get(&(site_id.clone(), path_key.to_owned()))
            .cloned())
    }

    async fn upsert_route_seo(
        &self,
        site_id: &SiteId,
        path_key: &str,
        seo: &Value,
    ) -> Result<(), RepositoryError> {
        self.data
            .lock()
            .await
            .route_seo
            .insert((site_id.clone(), path_key.to_owned()), seo.clone());
        Ok(())
    }
}
