//! Admin surface. Every route here sits behind the admin token.

pub mod api;
pub mod settings;
pub mod subscribers;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::admin_api_rate_limiter;
use crate::state::AppState;

/// HTML admin pages, mounted at `/admin`.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::edit))
        .route("/settings", post(settings::save))
        .route("/subscribers", get(subscribers::index))
        .route("/subscribers/export.csv", get(subscribers::export_csv))
        .route("/subscribers/{id}/delete", post(subscribers::delete))
}

/// Admin JSON API, mounted at `/api/admin`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/content", get(api::get_content).put(api::put_content))
        .route("/seo/{path_key}", put(api::put_route_seo))
        .route("/subscribers", get(api::list_subscribers))
        .route("/subscribers/stream", get(api::stream_subscribers))
        .route("/subscribers/{id}", axum::routing::delete(api::delete_subscriber))
        .layer(admin_api_rate_limiter())
}
