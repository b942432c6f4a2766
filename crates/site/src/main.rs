//! Coming-soon site - landing page, subscribe form and admin.
//!
//! This binary serves the site on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - Page content and subscribers in `PostgreSQL`, or in memory for local runs
//! - Live admin subscriber list over SSE, fed by `LISTEN/NOTIFY` so that
//!   deletions made with the CLI show up too

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use comingsoon_site::config::{SiteConfig, StoreConfig};
use comingsoon_site::db::{self, MemoryStore, PgStore, SUBSCRIBERS_CHANNEL};
use comingsoon_site::services::SubscriptionRegister;
use comingsoon_site::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = SiteConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "comingsoon_site=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p comingsoon-cli -- migrate
    let state = match &config.store {
        StoreConfig::Postgres { database_url } => {
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");

            let store = Arc::new(PgStore::new(pool.clone()));
            let state = AppState::new(config.clone(), Some(pool.clone()), store.clone(), store);
            tokio::spawn(listen_for_subscriber_changes(pool, state.register().clone()));
            state
        }
        StoreConfig::Memory => {
            tracing::warn!("Using the memory store; content and subscribers are lost on restart");
            let store = Arc::new(MemoryStore::new());
            AppState::new(config.clone(), None, store.clone(), store)
        }
    };

    let app = comingsoon_site::app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("site listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Connect info is the rate limiter's last resort for the client address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

/// Forward subscriber table notifications for this site to live feeds.
///
/// `PgListener` reconnects on its own after connection loss; a feed may miss
/// changes made while disconnected, so one refresh is pushed on reconnect.
async fn listen_for_subscriber_changes(pool: PgPool, register: SubscriptionRegister) {
    let mut listener = match PgListener::connect_with(&pool).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Subscriber change listener unavailable");
            return;
        }
    };
    if let Err(e) = listener.listen(SUBSCRIBERS_CHANNEL).await {
        tracing::error!(error = %e, channel = SUBSCRIBERS_CHANNEL, "LISTEN failed");
        return;
    }
    tracing::info!(channel = SUBSCRIBERS_CHANNEL, "Listening for subscriber changes");

    loop {
        match listener.try_recv().await {
            Ok(Some(notification)) => {
                if notification.payload() == register.site_id().as_str() {
                    register.notify_changed();
                }
            }
            Ok(None) => {
                tracing::warn!("Subscriber change listener reconnected");
                register.notify_changed();
            }
            Err(e) => {
                tracing::error!(error = %e, "Subscriber change listener failed");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
