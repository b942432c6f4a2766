//! Page content inspection.

use std::io::{self, Write};
use std::sync::Arc;

use comingsoon_core::content::MAX_DOCUMENT_BYTES;
use comingsoon_site::services::{ContentError, ContentService};

use super::{ConnectError, connect};

#[derive(Debug, thiserror::Error)]
pub enum ContentCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Print the page content as served, with its source and update time.
pub async fn show() -> Result<(), ContentCommandError> {
    let (config, store) = connect().await?;
    let service = ContentService::new(config.site_id, Arc::new(store), MAX_DOCUMENT_BYTES);

    let loaded = service.load().await?;
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &loaded)?;
    writeln!(out)?;
    Ok(())
}
