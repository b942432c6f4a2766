//! SEO injection for crawlers.
//!
//! For `GET` requests from crawler user agents that produce a successful
//! `text/html` response, the page title is rewritten and SEO meta tags are
//! added to the head. The site-wide SEO settings are combined field by field
//! with the override stored for the request path. Every other response
//! passes through untouched.

use axum::{
    body::{Body, HttpBody, to_bytes},
    extract::{Request, State},
    http::{
        Method, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::seo;
use crate::state::AppState;

/// Largest HTML body that will be buffered for rewriting.
const MAX_HTML_BYTES: usize = 2 * 1024 * 1024;

pub async fn seo_injection_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let from_crawler = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(seo::is_crawler);

    if !state.config().seo_injection || !from_crawler || request.method() != Method::GET {
        return next.run(request).await;
    }

    let path_key = seo::path_key(request.uri().path());
    let response = next.run(request).await;

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"));
    if !is_html || !response.status().is_success() {
        return response;
    }
    if !fits_buffer(&response) {
        tracing::debug!(path_key = %path_key, "HTML too large or unsized, skipping SEO injection");
        return response;
    }

    let global = match state.content().current().await {
        Ok(loaded) => loaded.content.seo.clone(),
        Err(e) => {
            tracing::warn!(error = %e, "SEO injection skipped: content unavailable");
            return response;
        }
    };
    let route = state.content().route_seo(&path_key).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, path_key = %path_key, "Route SEO unavailable, using site-wide SEO");
        None
    });
    let selected = seo::resolve(&global, route.as_deref());

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_HTML_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            // The body is gone once reading fails; size was checked above
            tracing::error!(error = %e, "Failed to buffer HTML for SEO injection");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = match String::from_utf8(bytes.to_vec()) {
        Ok(html) => seo::inject(&html, &selected),
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    tracing::debug!(path_key = %path_key, "Injected SEO tags for crawler");
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Whether the body is known to be at most `MAX_HTML_BYTES` long.
///
/// Both the body's upper size bound and any `Content-Length` must fit.
/// Streams without an upper bound are never buffered.
fn fits_buffer(response: &Response) -> bool {
    let fits = |len: u64| usize::try_from(len).is_ok_and(|len| len <= MAX_HTML_BYTES);
    let declared_fits = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .is_none_or(fits);
    declared_fits && response.body().size_hint().upper().is_some_and(fits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, middleware, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::SiteConfig;
    use crate::db::MemoryStore;

    const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1)";

    const SMALL_PAGE: &str = "<html><head><title>Small</title></head></html>";

    fn html(body: String) -> impl IntoResponse {
        ([(CONTENT_TYPE, "text/html; charset=utf-8")], body)
    }

    fn large_page() -> String {
        let filler = "<p>launch</p>".repeat(3 * 1024 * 1024 / 13 + 1);
        format!("<html><head><title>Big</title></head><body>{filler}</body></html>")
    }

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            SiteConfig::for_memory("seo-injection-test-token-81d3"),
            None,
            store.clone(),
            store,
        );
        Router::new()
            .route("/", get(|| async { html(SMALL_PAGE.to_owned()) }))
            .route("/big", get(|| async { html(large_page()) }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                seo_injection_middleware,
            ))
            .with_state(state)
    }

    async fn crawl(uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .header(USER_AGENT, GOOGLEBOT)
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_small_page_is_rewritten() {
        let (status, html) = crawl("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!html.contains("<title>Small</title>"));
        assert!(html.contains("og:type"));
    }

    #[tokio::test]
    async fn test_oversized_page_passes_through() {
        let (status, html) = crawl("/big").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(html, large_page());
        assert!(!html.contains("og:type"));
    }

    #[test]
    fn test_unsized_body_is_not_buffered() {
        let stream = futures::stream::iter([Ok::<_, std::io::Error>("<html></html>")]);
        let response = Response::new(Body::from_stream(stream));
        assert!(!fits_buffer(&response));
        assert!(fits_buffer(&Response::new(Body::from("<html></html>"))));
    }
}
