//! Integration tests for the coming-soon site.
//!
//! These run against a live server and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the site (memory store is enough)
//! SITE_STORE=memory SITE_ADMIN_TOKEN=... cargo run -p comingsoon-site
//!
//! # Run integration tests
//! SITE_ADMIN_TOKEN=... cargo test -p comingsoon-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_TEST_URL` - Base URL of the running site (default `http://localhost:3000`)
//! - `SITE_ADMIN_TOKEN` - Admin token the site was started with

use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

/// Connection details for a running site.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    admin_token: SecretString,
}

impl TestContext {
    /// Build a context from the environment.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn from_env() -> Self {
        let base_url = std::env::var("SITE_TEST_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let admin_token = SecretString::from(std::env::var("SITE_ADMIN_TOKEN").unwrap_or_default());
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            admin_token,
        }
    }

    /// Absolute URL for a path on the site.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the admin token to a request.
    #[must_use]
    pub fn as_admin(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.admin_token.expose_secret())
    }
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@integration.test", Uuid::new_v4().simple())
}

/// A documentation-range client address, so rate limits do not carry
/// over between tests.
#[must_use]
pub fn client_ip(n: u8) -> String {
    format!("192.0.2.{n}")
}
