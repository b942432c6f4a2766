//! Subscriber list, deletion and CSV export.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use comingsoon_core::SubscriberId;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::Subscriber;
use crate::services::export;
use crate::state::AppState;

/// Subscriber list page. Rows are refreshed live by
/// `static/js/admin-subscribers.js` from the SSE feed.
#[derive(Template, WebTemplate)]
#[template(path = "admin/subscribers.html")]
pub struct SubscribersTemplate {
    pub subscribers: Vec<Subscriber>,
}

/// `GET /admin/subscribers`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let subscribers = state.register().list().await?;
    Ok(SubscribersTemplate { subscribers })
}

/// `POST /admin/subscribers/{id}/delete`
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let id = SubscriberId::from_raw(id);
    state.register().delete(&id).await?;
    add_breadcrumb("admin", "Subscriber deleted", Some(&[("subscriber_id", id.as_str())]));
    Ok(Redirect::to("/admin/subscribers"))
}

/// `GET /admin/subscribers/export.csv`
#[instrument(skip(state))]
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let subscribers = state.register().list().await?;
    let csv = export::to_csv(&subscribers)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::filename(Utc::now().date_naive())
    );
    tracing::info!(count = subscribers.len(), "Subscribers exported");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
        csv,
    ))
}
