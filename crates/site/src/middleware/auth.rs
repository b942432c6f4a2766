//! Admin authentication.
//!
//! The admin surface is guarded by one shared token. API clients send it as
//! `Authorization: Bearer <token>`; browsers use HTTP Basic auth with the
//! token as the password (the user name is ignored).
//!
//! Browsers re-send Basic credentials on their own, so state-changing
//! requests that name a foreign `Origin` (or `Referer`) are refused even
//! with a valid token. The accepted origins are the request's `Host` and the
//! configured base URL.

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, HOST, ORIGIN, REFERER, WWW_AUTHENTICATE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::ExposeSecret;
use url::Url;

use crate::error::ActionOutcome;
use crate::state::AppState;

/// Reject requests that do not carry the admin token.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = state.config().admin_token.expose_secret();
    match presented_token(request.headers()) {
        Some(token) if constant_time_compare(&token, expected) => {
            if !request.method().is_safe()
                && !same_origin(request.headers(), &state.config().base_url)
            {
                tracing::warn!(
                    path = %request.uri().path(),
                    method = %request.method(),
                    "Cross-origin admin request refused"
                );
                return forbidden();
            }
            next.run(request).await
        }
        presented => {
            tracing::warn!(
                path = %request.uri().path(),
                credentials_sent = presented.is_some(),
                "Admin authentication failed"
            );
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(ActionOutcome::failure("unauthorized", "Admin token required")),
    )
        .into_response();
    response.headers_mut().insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static(r#"Basic realm="admin", charset="UTF-8""#),
    );
    response
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ActionOutcome::failure(
            "cross_origin",
            "Admin changes must come from the admin pages",
        )),
    )
        .into_response()
}

/// `host[:port]` of a URL, with the port only when it is explicit.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}

/// Whether a request's declared origin is this site.
///
/// Requests with neither `Origin` nor `Referer` come from non-browser
/// clients and pass. An `Origin` of `null` or one that does not parse is
/// treated as foreign.
fn same_origin(headers: &HeaderMap, base_url: &str) -> bool {
    let Some(source) = headers.get(ORIGIN).or_else(|| headers.get(REFERER)) else {
        return true;
    };
    let Some(source) = source
        .to_str()
        .ok()
        .and_then(|v| Url::parse(v).ok())
        .as_ref()
        .and_then(authority)
    else {
        return false;
    };

    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase());
    let base = Url::parse(base_url).ok().as_ref().and_then(authority);

    host.is_some_and(|h| h == source) || base.is_some_and(|b| b == source)
}

/// The token sent with a request, from either supported scheme.
fn presented_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, credentials) = value.split_once(' ')?;
    let credentials = credentials.trim();

    if scheme.eq_ignore_ascii_case("bearer") {
        return Some(credentials.to_owned());
    }
    if scheme.eq_ignore_ascii_case("basic") {
        let decoded = STANDARD.decode(credentials).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (_user, password) = decoded.split_once(':')?;
        return Some(password.to_owned());
    }
    None
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
