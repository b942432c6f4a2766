//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and isolation policies)
//! 5. SEO injection (crawler HTML rewriting)
//! 6. Per-route: admin auth and rate limiting (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod seo_injection;

pub use auth::require_admin;
pub use rate_limit::{admin_api_rate_limiter, subscribe_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use seo_injection::seo_injection_middleware;
