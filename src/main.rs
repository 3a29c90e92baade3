//! Instrumented Cache - HTTP server entry point
//!
//! Serves the instrumented cache and the TTL page cache over HTTP, backed by
//! Redis when `REDIS_URL` is set and by the in-memory store otherwise.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use instrumented_cache::api::create_router;
use instrumented_cache::{
    spawn_cleanup_task, AppState, Config, HttpFetcher, InstrumentedCache, MemoryStore, PageCache,
    RedisStore, StoreClient,
};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the backing store (Redis or in-memory)
/// 4. Build the instrumented cache and the page cache
/// 5. Start the TTL cleanup task for the in-memory store
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "instrumented_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting instrumented cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: redis={}, port={}, page_ttl={}s, fetch_timeout={}s, flush_on_start={}",
        config.redis_url.as_deref().unwrap_or("<in-memory>"),
        config.server_port,
        config.page_ttl,
        config.fetch_timeout,
        config.flush_on_start
    );

    let (store, cleanup_handle): (Arc<dyn StoreClient>, Option<JoinHandle<()>>) =
        match &config.redis_url {
            Some(url) => {
                let redis = RedisStore::open(url).context("connecting to Redis")?;
                (Arc::new(redis) as Arc<dyn StoreClient>, None)
            }
            None => {
                let memory = Arc::new(MemoryStore::new());
                let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
                info!("Using in-memory store with background TTL cleanup");
                (memory as Arc<dyn StoreClient>, Some(handle))
            }
        };

    let cache = if config.flush_on_start {
        InstrumentedCache::new(store.clone()).context("flushing backing store")?
    } else {
        InstrumentedCache::without_flush(store.clone())
    };
    let pages = PageCache::with_ttl(
        store,
        HttpFetcher::new(config.fetch_timeout),
        config.page_ttl,
    );

    let app = create_router(AppState::new(cache, pages));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
