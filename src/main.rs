//! King of the Table binary entrypoint wiring the REST API, game registry and stats store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use king_of_the_table::{
    config::{AppConfig, StorageBackend},
    dao::stats_store::{StatsStore, memory::MemoryStatsStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let stats_store = build_stats_store(&config).await?;

    let app_state = AppState::new(&config, stats_store);
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Instantiate the configured stats backend.
///
/// An unreachable CouchDB does not prevent startup: the persistence worker
/// keeps retrying and reconnecting in the background.
async fn build_stats_store(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn StatsStore>>> {
    match config.storage {
        StorageBackend::Disabled => {
            info!("stats store disabled; games are kept in memory only");
            Ok(None)
        }
        StorageBackend::Memory => {
            info!("using in-memory stats store");
            Ok(Some(Arc::new(MemoryStatsStore::new())))
        }
        StorageBackend::Couch => couch_stats_store(config).await,
    }
}

#[cfg(feature = "couch-store")]
async fn couch_stats_store(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn StatsStore>>> {
    use king_of_the_table::dao::stats_store::couchdb::{CouchConfig, CouchStatsStore};

    let couch_config = CouchConfig::from_env()
        .context("reading CouchDB configuration")?
        .with_request_timeout(config.retry.attempt_timeout);
    let database = couch_config.database.clone();
    let store = CouchStatsStore::new(couch_config).context("building CouchDB client")?;

    match store.try_reconnect().await {
        Ok(()) => info!(%database, "connected to CouchDB"),
        Err(err) => warn!(
            %database,
            error = %err,
            "CouchDB unreachable at startup; writes will be retried"
        ),
    }

    Ok(Some(Arc::new(store)))
}

#[cfg(not(feature = "couch-store"))]
async fn couch_stats_store(_config: &AppConfig) -> anyhow::Result<Option<Arc<dyn StatsStore>>> {
    anyhow::bail!("CouchDB backend requested but the `couch-store` feature is disabled")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
