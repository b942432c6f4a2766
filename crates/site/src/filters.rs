//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders restricted markdown to HTML. The output is already escaped.
///
/// Usage in templates: `{{ content.description|markdown|safe }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn markdown(text: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(comingsoon_core::parse_markdown(&text.to_string()))
}
