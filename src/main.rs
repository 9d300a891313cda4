//! Music Catalog server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use music_catalog::cache::{CacheStore, MemoryStore, RedisStore};
use music_catalog::{create_router, spawn_cleanup_task, AppState, CacheBackendKind, Config};

/// Startup sequence:
/// 1. Initialize tracing
/// 2. Load configuration from environment variables
/// 3. Build and connect the cache store (a failed connect leaves the service running uncached)
/// 4. Start the expiry sweep for the in-memory store
/// 5. Serve until SIGINT/SIGTERM, then disconnect the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" for this crate, overridable with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "music_catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Music Catalog server");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        backend = ?config.cache_backend,
        default_ttl = config.default_ttl,
        "configuration loaded"
    );

    let (store, cleanup_handle): (Arc<dyn CacheStore>, Option<JoinHandle<()>>) =
        match config.cache_backend {
            CacheBackendKind::Memory => {
                let memory = Arc::new(MemoryStore::new(config.max_entries));
                let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
                (memory, Some(handle))
            }
            CacheBackendKind::Redis => (
                Arc::new(RedisStore::new(
                    &config.redis_url,
                    config.redis_pool_size,
                    config.redis_timeout_ms,
                )),
                None,
            ),
        };

    let state = AppState::from_config(&config, store);
    if state.cache.connect().await {
        info!(backend = state.cache.backend_name(), "cache connected");
    } else {
        warn!(
            backend = state.cache.backend_name(),
            "cache unavailable at startup, serving uncached"
        );
    }

    let cache = state.cache.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    cache.disconnect().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the expiry sweep.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
