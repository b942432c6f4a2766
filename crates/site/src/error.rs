//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Every failure reaches the client as
//! an [`ActionOutcome`] JSON body; server-side failures are captured to
//! Sentry first and their details are not exposed.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ContentError;
use crate::services::export::ExportError;
use crate::services::{FieldError, RegisterError};

/// Result of an operation as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ActionOutcome {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            code: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code: Some(code),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = fields;
        self
    }
}

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Subscription operation failed.
    #[error("Register error: {0}")]
    Register(#[from] RegisterError),

    /// Content operation failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// CSV export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Register(RegisterError::Repository(_))
                | Self::Content(
                    ContentError::Repository(_) | ContentError::Serialization(_)
                )
                | Self::Export(_)
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Register(RegisterError::Validation(_))
            | Self::Content(ContentError::InvalidSeo(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Content(ContentError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Register(RegisterError::Repository(_))
            | Self::Content(ContentError::Repository(_) | ContentError::Serialization(_))
            | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing outcome. Internal details are never included.
    #[must_use]
    pub fn outcome(&self) -> ActionOutcome {
        match self {
            Self::Register(RegisterError::Validation(fields)) => {
                ActionOutcome::failure("validation", "Please correct the highlighted fields.")
                    .with_fields(fields.clone())
            }
            Self::Content(ContentError::InvalidSeo(msg)) => {
                ActionOutcome::failure("validation", msg.clone())
            }
            Self::Content(ContentError::TooLarge(e)) => {
                ActionOutcome::failure("too_large", e.to_string())
            }
            Self::Register(RegisterError::Repository(_))
            | Self::Content(ContentError::Repository(_) | ContentError::Serialization(_)) => {
                ActionOutcome::failure("store_error", "Storage is unavailable, please try again.")
            }
            Self::Export(_) => ActionOutcome::failure("internal", "Internal server error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(self.outcome())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for visitor and admin actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
