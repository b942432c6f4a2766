//! Subscription register: at most one subscriber per normalized email per
//! site, plus a live feed of the subscriber list.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use comingsoon_core::{Email, Phone, SiteId, SubscriberId};
use futures::Stream;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use crate::db::{InsertOutcome, RepositoryError, SubscriberRepository};
use crate::models::{NewSubscriber, Subscriber};

/// Longest accepted subscriber name, in characters.
pub const MAX_NAME_CHARS: usize = 100;

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Errors from register operations.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Input was rejected; nothing was attempted.
    #[error("invalid subscription: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// The store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of a subscribe call that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created(Subscriber),
    AlreadySubscribed,
}

/// Validate raw form input into a subscription ready to be written.
///
/// # Errors
///
/// Returns every invalid field at once: a missing or overlong name, a
/// malformed email, or a phone number with too few or too many digits.
/// An empty phone is treated as not given.
pub fn validate(
    name: &str,
    email: &str,
    phone: Option<&str>,
) -> Result<NewSubscriber, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError {
            field: "name",
            message: "Please enter your name".to_owned(),
        });
    } else if name.chars().count() > MAX_NAME_CHARS {
        errors.push(FieldError {
            field: "name",
            message: format!("Name must be at most {MAX_NAME_CHARS} characters"),
        });
    }

    let email = Email::parse(email).map_err(|e| {
        errors.push(FieldError {
            field: "email",
            message: format!("Please enter a valid email address ({e})"),
        });
    });

    let phone = phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(Phone::parse)
        .transpose()
        .map_err(|e| {
            errors.push(FieldError {
                field: "phone",
                message: format!("Please enter a valid phone number ({e})"),
            });
        });

    match (email, phone) {
        (Ok(email), Ok(phone)) if errors.is_empty() => {
            Ok(NewSubscriber::new(name.to_owned(), email, phone))
        }
        _ => Err(errors),
    }
}

/// Records subscriptions and publishes changes to live feeds.
///
/// Cheap to clone; clones share the store, the change counter and the
/// watcher count.
#[derive(Clone)]
pub struct SubscriptionRegister {
    site_id: SiteId,
    repo: Arc<dyn SubscriberRepository>,
    changes: Arc<watch::Sender<u64>>,
    watchers: Arc<AtomicUsize>,
}

impl SubscriptionRegister {
    #[must_use]
    pub fn new(site_id: SiteId, repo: Arc<dyn SubscriberRepository>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            site_id,
            repo,
            changes: Arc::new(changes),
            watchers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The site this register writes to.
    #[must_use]
    pub const fn site_id(&self) -> &SiteId {
        &self.site_id
    }

    /// Validate and record a subscription.
    ///
    /// Of any number of concurrent calls whose emails normalize to the same
    /// address, exactly one returns `Created`; the others return
    /// `AlreadySubscribed`.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::Validation` without touching the store when
    /// input is invalid, and `RegisterError::Repository` when the store fails.
    #[instrument(skip(self, name, phone), fields(site_id = %self.site_id))]
    pub async fn subscribe(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<SubscribeOutcome, RegisterError> {
        let subscriber = validate(name, email, phone).map_err(RegisterError::Validation)?;

        match self.repo.insert_if_absent(&self.site_id, &subscriber).await? {
            InsertOutcome::Inserted(created) => {
                tracing::info!(
                    subscriber_id = %created.id,
                    email = %created.email,
                    "Subscriber created"
                );
                self.notify_changed();
                Ok(SubscribeOutcome::Created(created))
            }
            InsertOutcome::AlreadyExists => {
                tracing::info!(subscriber_id = %subscriber.id, "Already subscribed");
                Ok(SubscribeOutcome::AlreadySubscribed)
            }
        }
    }

    /// Remove a subscriber. Removing an unknown id succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::Repository` when the store fails.
    #[instrument(skip(self), fields(site_id = %self.site_id))]
    pub async fn delete(&self, id: &SubscriberId) -> Result<(), RegisterError> {
        if self.repo.delete(&self.site_id, id).await? {
            tracing::info!(subscriber_id = %id, "Subscriber deleted");
            self.notify_changed();
        }
        Ok(())
    }

    /// All subscribers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::Repository` when the store fails.
    pub async fn list(&self) -> Result<Vec<Subscriber>, RegisterError> {
        Ok(self.repo.list(&self.site_id).await?)
    }

    /// Tell live feeds the subscriber list changed.
    ///
    /// Called after local writes, and by the database listener for writes
    /// made by other processes.
    pub fn notify_changed(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }

    /// Open a live feed of the subscriber list.
    #[must_use]
    pub fn watch(&self) -> SubscriberFeed {
        self.watchers.fetch_add(1, Ordering::SeqCst);
        SubscriberFeed {
            register: self.clone(),
            changes: self.changes.subscribe(),
            primed: false,
        }
    }

    /// Number of feeds currently open.
    #[must_use]
    pub fn active_watchers(&self) -> usize {
        self.watchers.load(Ordering::SeqCst)
    }
}

/// A live view of the subscriber list.
///
/// Yields a full snapshot immediately and again after every change. The
/// feed is released when dropped or closed.
pub struct SubscriberFeed {
    register: SubscriptionRegister,
    changes: watch::Receiver<u64>,
    primed: bool,
}

impl SubscriberFeed {
    /// Wait for the next snapshot.
    ///
    /// The first call returns at once. Returns `None` if the change channel
    /// has closed.
    pub async fn next_snapshot(&mut self) -> Option<Result<Vec<Subscriber>, RegisterError>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        }
        self.primed = true;
        drop(self.changes.borrow_and_update());
        Some(self.register.list().await)
    }

    /// Turn the feed into a stream of snapshots. Dropping the stream
    /// releases the feed.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Subscriber>, RegisterError>> {
        let mut feed = self;
        async_stream::stream! {
            while let Some(snapshot) = feed.next_snapshot().await {
                yield snapshot;
            }
        }
    }

    /// Release the feed.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for SubscriberFeed {
    fn drop(&mut self) {
        self.register.watchers.fetch_sub(1, Ordering::SeqCst);
    }
}
