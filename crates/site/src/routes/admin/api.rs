//! Admin JSON API.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use comingsoon_core::SubscriberId;
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::{ActionOutcome, Result};
use crate::models::Subscriber;
use crate::seo::{self, SeoOverride};
use crate::services::LoadedContent;
use crate::state::AppState;

/// An outcome with the data it produced.
#[derive(Debug, Serialize)]
pub struct WithData<T> {
    #[serde(flatten)]
    pub outcome: ActionOutcome,
    pub data: T,
}

/// `GET /api/admin/content`
pub async fn get_content(State(state): State<AppState>) -> Result<Json<LoadedContent>> {
    let loaded = state.content().current().await?;
    Ok(Json(LoadedContent::clone(&loaded)))
}

/// `PUT /api/admin/content`
#[instrument(skip(state, payload))]
pub async fn put_content(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<WithData<LoadedContent>>> {
    let saved = state.content().save(&payload).await?;
    Ok(Json(WithData {
        outcome: ActionOutcome::ok("Content saved"),
        data: saved,
    }))
}

/// `PUT /api/admin/seo/{path_key}`
#[instrument(skip(state, payload))]
pub async fn put_route_seo(
    State(state): State<AppState>,
    Path(path_key): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<WithData<SeoOverride>>> {
    let key = seo::path_key(&path_key);
    let saved = state.content().save_route_seo(&key, &payload).await?;
    Ok(Json(WithData {
        outcome: ActionOutcome::ok(format!("SEO saved for {key}")),
        data: saved,
    }))
}

/// `GET /api/admin/subscribers`
pub async fn list_subscribers(State(state): State<AppState>) -> Result<Json<Vec<Subscriber>>> {
    Ok(Json(state.register().list().await?))
}

/// `DELETE /api/admin/subscribers/{id}`
#[instrument(skip(state))]
pub async fn delete_subscriber(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionOutcome>> {
    state.register().delete(&SubscriberId::from_raw(id)).await?;
    Ok(Json(ActionOutcome::ok("Subscriber deleted")))
}

/// `GET /api/admin/subscribers/stream`
///
/// Sends a `snapshot` event with the full list on connect and after every
/// change. The feed is released when the client disconnects.
pub async fn stream_subscribers(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let feed = state.register().watch();
    tracing::debug!(watchers = state.register().active_watchers(), "Subscriber feed opened");

    let events = feed.into_stream().map(|snapshot| {
        let event = match snapshot {
            Ok(subscribers) => {
                let json = serde_json::to_string(&subscribers).unwrap_or_else(|_| "[]".to_string());
                Event::default().event("snapshot").data(json)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Subscriber snapshot failed");
                Event::default()
                    .event("error")
                    .data(r#"{"message":"Subscriber list unavailable"}"#)
            }
        };
        Ok(event)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
