//! Open Graph image endpoint.

use axum::{
    extract::Query,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};

use crate::og::{self, OgImageParams};

/// `GET /og-image?title=&bg=&logo=` renders a 1200x630 SVG card.
pub async fn og_image(Query(params): Query<OgImageParams>) -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "image/svg+xml; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        og::render(&params),
    )
}
