//! Business logic services for the site.
//!
//! # Services
//!
//! - `register` - Subscriber dedup, deletion and the live subscriber feed
//! - `content` - Page content merge-on-load, sanitize-on-save, size ceiling
//! - `export` - CSV export of the subscriber list

pub mod content;
pub mod export;
pub mod register;

pub use content::{ContentError, ContentService, ContentSource, LoadedContent};
pub use register::{
    FieldError, RegisterError, SubscribeOutcome, SubscriberFeed, SubscriptionRegister,
};
