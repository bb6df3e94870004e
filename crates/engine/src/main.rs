//! Dice Tally Engine - Main entry point.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dicetally_engine::api;
use dicetally_engine::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    persistence::{SqliteConnection, SqliteDiceRepository, SqliteSessionRepository},
    ports::ClockPort,
};
use dicetally_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may run from `crates/engine`).
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dicetally_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dice Tally Engine");

    let config = EngineConfig::from_env();
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let connection = SqliteConnection::new(&config.database_path).await?;
    let dice = Arc::new(SqliteDiceRepository::new(connection.clone(), clock.clone()));
    let sessions = Arc::new(SqliteSessionRepository::new(connection, clock));

    let app = Arc::new(App::new(dice, sessions, config.tally_debounce));

    let mut router = api::http::routes()
        .with_state(app.clone())
        .layer(TraceLayer::new_for_http());
    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    let cancel_token = CancellationToken::new();
    setup_shutdown_signal(cancel_token.clone());
    let sweeper = app
        .trackers
        .spawn_idle_sweeper(config.tracker_idle_timeout, cancel_token.clone());

    let addr = config.bind_address();
    tracing::info!(
        %addr,
        database = %config.database_path,
        debounce_ms = config.tally_debounce.as_millis() as u64,
        idle_timeout_secs = config.tracker_idle_timeout.as_secs(),
        "Listening"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            tracing::info!("HTTP server received shutdown signal");
        })
        .await?;

    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Idle tracker sweeper panicked");
    }
    app.shutdown().await;
    tracing::info!("Dice Tally Engine shutdown complete");
    Ok(())
}

/// Cancel `cancel_token` on Ctrl+C or SIGTERM.
fn setup_shutdown_signal(cancel_token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown..."),
            _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        }

        cancel_token.cancel();
    });
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins.map(str::trim).filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        tracing::warn!("CORS configured to allow ANY origin");
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        tracing::info!(?origins, "CORS configured");
        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
