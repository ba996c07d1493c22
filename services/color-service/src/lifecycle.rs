//! Startup and shutdown of the store connection

use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::store::ColorStore;

/// Make sure the store is reachable and start from an empty database.
///
/// An unreachable store is fatal, and so is failing to count its keys: the
/// error is returned so the caller can exit before accepting requests. A
/// failed flush is only logged.
pub async fn startup(store: &dyn ColorStore) -> Result<()> {
    if let Err(e) = store.ping().await {
        error!(error = %e, "Failed to connect to Redis");
        return Err(e).context("Redis is not reachable");
    }

    let keys_exist = match store.keys_exist().await {
        Ok(keys_exist) => keys_exist,
        Err(e) => {
            error!(error = %e, "Failed to check for existing keys");
            return Err(e).context("Failed to check for existing keys");
        }
    };

    if keys_exist {
        info!("Some keys exist in the database. Flushing all keys before starting");
        if let Err(e) = store.flush().await {
            error!(error = %e, "Failed to flush all keys in the database");
        }
    }

    Ok(())
}

/// Serve `app` on `addr` until `signal` resolves, then run `shutdown`.
///
/// The store is flushed and closed even when binding or serving fails; the
/// server error is returned afterwards.
pub async fn run<F>(store: &dyn ColorStore, addr: SocketAddr, app: Router, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let served = serve(addr, app, signal).await;
    if let Err(e) = &served {
        error!(error = %e, "HTTP server stopped with an error");
    }

    shutdown(store).await;
    served
}

async fn serve<F>(addr: SocketAddr, app: Router, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Color Service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .context("HTTP server failed")
}

/// Flush the database and close the connection
pub async fn shutdown(store: &dyn ColorStore) {
    info!("Flushing the database before shutdown");
    if let Err(e) = store.flush().await {
        error!(error = %e, "Failed to flush all keys in the database");
    }

    info!("Closing the Redis connection");
    store.close().await;
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(err) => error!("failed to install Ctrl+C handler: {}", err),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => error!("failed to install SIGTERM handler: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
