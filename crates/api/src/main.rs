//! Process entry point.
//!
//! Owns the full lifecycle: read config, wire up telemetry, build the
//! shared state and router, serve until a shutdown signal arrives. All
//! stores live inside [`AppState`]; nothing here or below reaches for
//! process-wide storage.

#![cfg_attr(not(test), forbid(unsafe_code))]

use cartwheel_api::config::AppConfig;
use cartwheel_api::routes;
use cartwheel_api::state::AppState;

use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("configuration");

    // Sentry has to exist before the subscriber so its tracing layer can
    // forward events; the guard flushes pending events on drop.
    let _sentry_guard = config.sentry_dsn.as_deref().map(init_sentry);
    init_tracing();

    tracing::info!(mode = ?config.mode, "starting cartwheel-api");

    let addr = config.socket_addr();
    let state = AppState::new(config);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        // Sentry layers outermost so every request is covered
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind address");
    tracing::info!("api listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server");
}

fn init_sentry(dsn: &str) -> sentry::ClientInitGuard {
    sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ))
}

/// Subscriber: env-filtered fmt output plus the Sentry bridge, which
/// promotes warnings and errors to events and keeps info/debug lines as
/// breadcrumbs.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwheel_api=info,tower_http=debug".into());

    let sentry_layer = sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        () = sigterm => {},
    }

    tracing::info!("shutdown signal received");
}
