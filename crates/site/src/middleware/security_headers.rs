//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! The landing page shows images from admin-configured hosts, so `img-src`
//! allows any HTTPS origin and the embedder policy is `credentialless`
//! rather than `require-corp`. Inline styles carry the admin-chosen accent
//! colors and font sizes.

use std::sync::LazyLock;

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content Security Policy directives, joined with `; `.
const CSP_DIRECTIVES: &[&str] = &[
    "default-src 'none'",
    "script-src 'self'",
    "style-src 'self' 'unsafe-inline'",
    "font-src 'self'",
    "img-src 'self' https: data:",
    "connect-src 'self'",
    "frame-src 'none'",
    "object-src 'none'",
    "base-uri 'self'",
    "form-action 'self'",
    "frame-ancestors 'none'",
];

/// Browser features the site never uses.
const DENIED_FEATURES: &[&str] = &[
    "accelerometer",
    "autoplay",
    "browsing-topics",
    "camera",
    "display-capture",
    "geolocation",
    "gyroscope",
    "interest-cohort",
    "magnetometer",
    "microphone",
    "payment",
    "usb",
    "xr-spatial-tracking",
];

/// Default for responses whose handler did not choose a cache policy.
const DEFAULT_CACHE_CONTROL: &str = "no-store, max-age=0";

static CSP: LazyLock<HeaderValue> = LazyLock::new(|| {
    HeaderValue::from_str(&CSP_DIRECTIVES.join("; ")).expect("Invalid CSP header")
});

static PERMISSIONS_POLICY: LazyLock<HeaderValue> = LazyLock::new(|| {
    let policy = DENIED_FEATURES
        .iter()
        .map(|feature| format!("{feature}=()"))
        .collect::<Vec<_>>()
        .join(", ");
    HeaderValue::from_str(&policy).expect("Invalid Permissions-Policy header")
});

/// Headers set on every response, overwriting handler values.
fn fixed_headers() -> [(HeaderName, HeaderValue); 9] {
    [
        (X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (CONTENT_SECURITY_POLICY, CSP.clone()),
        (
            HeaderName::from_static("permissions-policy"),
            PERMISSIONS_POLICY.clone(),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-embedder-policy"),
            HeaderValue::from_static("credentialless"),
        ),
        (
            HeaderName::from_static("x-dns-prefetch-control"),
            HeaderValue::from_static("off"),
        ),
    ]
}

/// Add security headers to all responses.
///
/// `Cache-Control` is only filled in when the handler left it unset, so the
/// OG image and CSV export keep their own policies.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in fixed_headers() {
        headers.insert(name, value);
    }
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(DEFAULT_CACHE_CONTROL));
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "page" }))
            .route(
                "/cached",
                get(|| async { ([(CACHE_CONTROL, "public, max-age=3600")], "image") }),
            )
            .layer(middleware::from_fn(security_headers_middleware))
    }

    async fn headers_for(uri: &str) -> axum::http::HeaderMap {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .headers()
            .clone()
    }

    #[tokio::test]
    async fn test_defaults_applied() {
        let headers = headers_for("/").await;
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[CACHE_CONTROL], DEFAULT_CACHE_CONTROL);
        let csp = headers[CONTENT_SECURITY_POLICY].to_str().unwrap();
        assert!(csp.starts_with("default-src 'none'; script-src 'self'"));
        assert!(csp.contains("img-src 'self' https: data:"));
        assert!(headers["permissions-policy"].to_str().unwrap().contains("camera=()"));
    }

    #[tokio::test]
    async fn test_handler_cache_policy_is_kept() {
        let headers = headers_for("/cached").await;
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=3600");
    }
}
