//! Subscriber maintenance commands.
//!
//! Deletions made here reach open admin pages through the database's
//! change notifications.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use comingsoon_core::{Email, SubscriberId};
use comingsoon_site::services::export::{self, ExportError};
use comingsoon_site::services::{RegisterError, SubscriptionRegister};

use super::{ConnectError, connect};

#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No subscriber matches {0}")]
    NotFound(String),
}

async fn register() -> Result<SubscriptionRegister, SubscriberError> {
    let (config, store) = connect().await?;
    Ok(SubscriptionRegister::new(config.site_id, Arc::new(store)))
}

/// Print subscribers as a table, newest first.
pub async fn list() -> Result<(), SubscriberError> {
    let subscribers = register().await?.list().await?;

    let mut out = io::stdout().lock();
    writeln!(out, "{:<20} {:<32} {:<36} {:<16} {}", "SUBSCRIBED", "NAME", "EMAIL", "PHONE", "ID")?;
    for s in &subscribers {
        writeln!(
            out,
            "{:<20} {:<32} {:<36} {:<16} {}",
            s.subscribed_at.format("%Y-%m-%d %H:%M:%S"),
            s.name,
            s.email,
            s.phone_display(),
            s.id
        )?;
    }
    tracing::info!(count = subscribers.len(), "Listed subscribers");
    Ok(())
}

/// Write the CSV export to a file, or stdout.
///
/// When `output` is a directory the file inside it gets the same dated name
/// as the admin download.
pub async fn export(output: Option<&Path>) -> Result<(), SubscriberError> {
    let subscribers = register().await?.list().await?;

    match output {
        Some(path) => {
            let path = export_path(path, Utc::now().date_naive());
            export::write_csv(&subscribers, File::create(&path)?)?;
            tracing::info!(count = subscribers.len(), path = %path.display(), "Exported subscribers");
        }
        None => export::write_csv(&subscribers, io::stdout().lock())?,
    }
    Ok(())
}

fn export_path(output: &Path, today: NaiveDate) -> PathBuf {
    if output.is_dir() {
        output.join(export::filename(today))
    } else {
        output.to_path_buf()
    }
}

/// Delete a subscriber by id, or by the email it was registered with.
pub async fn delete(target: &str) -> Result<(), SubscriberError> {
    let register = register().await?;
    let id = if target.contains('@') {
        let email = Email::parse(target).map_err(|e| SubscriberError::InvalidEmail(e.to_string()))?;
        SubscriberId::for_email(&email)
    } else {
        SubscriberId::from_raw(target)
    };

    let exists = register.list().await?.iter().any(|s| s.id == id);
    if !exists {
        return Err(SubscriberError::NotFound(target.to_owned()));
    }

    register.delete(&id).await?;
    tracing::info!(subscriber_id = %id, "Subscriber deleted");
    Ok(())
}
