//! CSV export of the subscriber list.

use std::io;

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::models::Subscriber;

/// Column headers, in order.
pub const HEADER: [&str; 4] = ["Name", "Email", "Phone", "Subscribed At"];

/// Timestamp format of the `Subscribed At` column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write subscribers as CSV with every field quoted.
///
/// # Errors
///
/// Returns `ExportError` if writing to `out` fails.
pub fn write_csv<W: io::Write>(subscribers: &[Subscriber], out: W) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(out);

    writer.write_record(HEADER)?;
    for subscriber in subscribers {
        let subscribed_at = subscriber.subscribed_at.format(TIMESTAMP_FORMAT).to_string();
        writer.write_record([
            subscriber.name.as_str(),
            subscriber.email.as_str(),
            subscriber.phone_display(),
            subscribed_at.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Render subscribers as a CSV string.
///
/// # Errors
///
/// Returns `ExportError` if encoding fails.
pub fn to_csv(subscribers: &[Subscriber]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(subscribers, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Download file name for an export made on `date`.
#[must_use]
pub fn filename(date: NaiveDate) -> String {
    format!("subscribers-{}.csv", date.format("%Y-%m-%d"))
}
