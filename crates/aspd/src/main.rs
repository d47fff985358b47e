//! aspd — ASP animal/sound server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use asp_core::config::AspConfig;
use asp_services::{Catalog, MethodDispatcher};
use aspd::AspListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Config is resolved before logging so the filter can come from it.
    let written = AspConfig::write_default_if_missing();
    let loaded = AspConfig::load();
    let mut config = loaded.as_ref().cloned().unwrap_or_default();

    if let Some(path) = std::env::args().nth(1) {
        config.catalog.path = PathBuf::from(path);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    if let Err(e) = written {
        tracing::warn!(error = %e, "failed to write default config");
    }
    if let Err(e) = loaded {
        tracing::warn!(error = %e, "failed to load config, using defaults");
    }

    // A missing or malformed catalog is fatal.
    let catalog = Catalog::load(&config.catalog.path).with_context(|| {
        format!(
            "failed to load catalog from {}",
            config.catalog.path.display()
        )
    })?;
    tracing::info!(
        path = %config.catalog.path.display(),
        animals = catalog.len(),
        "catalog loaded"
    );
    let dispatcher = Arc::new(MethodDispatcher::new(Arc::new(catalog)));

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    let listener = AspListener::bind(config.bind_addr(), dispatcher, shutdown_tx.subscribe())
        .await
        .with_context(|| format!("failed to listen on {}", config.bind_addr()))?;
    tracing::info!(addr = %listener.local_addr()?, "aspd starting");

    listener.run().await
}
