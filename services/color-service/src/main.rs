//! Color Service
//!
//! HTTP service that stores random colors in Redis and reports their tally.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use color_service::config::{Cli, StoreKind};
use color_service::prometheus::Metrics;
use color_service::{lifecycle, router, telemetry, AppState, ColorStore, MemoryStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_format);

    info!("Starting Color Service");

    let store: Arc<dyn ColorStore> = match cli.store {
        StoreKind::Redis => {
            let config = cli.store_config();
            let store = RedisStore::connect(&config)
                .await
                .with_context(|| format!("Failed to connect to Redis at {}", config.url()))?;
            Arc::new(store)
        }
        StoreKind::Memory => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    lifecycle::startup(store.as_ref()).await?;

    let metrics = Metrics::init()?;
    let app = router(AppState::new(store.clone(), metrics));

    lifecycle::run(
        store.as_ref(),
        cli.listen_addr(),
        app,
        lifecycle::shutdown_signal(),
    )
    .await
}
