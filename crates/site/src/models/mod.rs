//! Domain models for the site.

use chrono::{DateTime, Utc};
use comingsoon_core::{Email, Phone, SiteId, SubscriberId};
use serde::Serialize;

/// A recorded subscription. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: SubscriberId,
    pub site_id: SiteId,
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    /// Phone number for display, empty when none was given.
    #[must_use]
    pub fn phone_display(&self) -> &str {
        self.phone.as_ref().map_or("", Phone::as_str)
    }
}

/// A validated subscription waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscriber {
    pub id: SubscriberId,
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
}

impl NewSubscriber {
    /// Build a subscription whose id is derived from the email.
    #[must_use]
    pub fn new(name: String, email: Email, phone: Option<Phone>) -> Self {
        Self {
            id: SubscriberId::for_email(&email),
            name,
            email,
            phone,
        }
    }
}
