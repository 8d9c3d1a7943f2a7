#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics on startup errors.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;

use lineage_server::{
    LineageReader, Store,
    config::ServerConfig,
    server::{AppState, router},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lineage_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // The database URL is left out on purpose, it may carry credentials.
    tracing::info!(
        "Loaded configuration: listen_port={}, index_path={}, max_connections={}, max_concurrent_queries={}, request_timeout={:?}",
        config.listen_port,
        config.index_path.display(),
        config.max_connections,
        config.max_concurrent_queries,
        config.request_timeout
    );

    // An unreachable store at startup is fatal.
    let store = match Store::connect(&config.store_options()).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open lineage store: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to {} lineage store", store.backend());

    let reader = LineageReader::new(store.clone(), config.max_concurrent_queries);
    let state = AppState::new(reader, config.index_path.clone(), config.request_timeout);
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
    }

    // In-flight requests have drained; release pooled connections.
    store.close().await;
    tracing::info!("lineage store closed, exiting");
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
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
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
