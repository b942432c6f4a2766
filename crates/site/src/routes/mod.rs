//! HTTP route handlers for the coming-soon site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (store connectivity)
//! GET  /og-image               - Generated social preview image (SVG)
//! GET  /seo-health             - Resolved SEO for a path (diagnostics)
//!
//! # Subscribe (rate limited)
//! POST /subscribe              - HTML form submit, renders a result page
//! POST /api/subscribe          - JSON submit, returns an ActionOutcome
//!
//! # Admin pages (admin token)
//! GET  /admin                           - Content settings form
//! POST /admin/settings                  - Save content settings
//! GET  /admin/subscribers               - Subscriber list (live)
//! GET  /admin/subscribers/export.csv    - CSV download
//! POST /admin/subscribers/{id}/delete   - Delete a subscriber
//!
//! # Admin API (admin token, rate limited)
//! GET  /api/admin/content               - Current content with provenance
//! PUT  /api/admin/content               - Save content
//! PUT  /api/admin/seo/{path_key}        - Save a per-route SEO override
//! GET  /api/admin/subscribers           - Subscriber list
//! GET  /api/admin/subscribers/stream    - Live subscriber list (SSE)
//! DELETE /api/admin/subscribers/{id}    - Delete a subscriber
//! ```

pub mod admin;
pub mod home;
pub mod og;
pub mod seo_health;
pub mod subscribe;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::{require_admin, subscribe_rate_limiter};
use crate::state::AppState;

/// Create the subscribe routes router.
pub fn subscribe_routes() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe::subscribe_form))
        .route("/api/subscribe", post(subscribe::subscribe_api))
        .layer(subscribe_rate_limiter())
}

/// Create all routes for the site.
pub fn routes(state: &AppState) -> Router<AppState> {
    let admin_guard = from_fn_with_state(state.clone(), require_admin);

    Router::new()
        // Landing page
        .route("/", get(home::home))
        .route("/og-image", get(og::og_image))
        .route("/seo-health", get(seo_health::seo_health))
        // Subscribe
        .merge(subscribe_routes())
        // Admin
        .nest("/admin", admin::page_routes().route_layer(admin_guard.clone()))
        .nest("/api/admin", admin::api_routes().route_layer(admin_guard))
}
