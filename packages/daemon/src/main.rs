mod config;
mod error;
#[cfg(unix)]
mod server;
mod storage;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let config = config::DaemonAppConfig::load()
        .context("Failed to load config")?
        .daemon;
    let storage = storage::DaemonStorage::read_or_create(&config.storage_dir)
        .await
        .context("Failed to read daemon storage")?;
    info!(nodes = storage.nodes.len(), "Loaded node list");

    run(config, storage).await
}

#[cfg(unix)]
async fn run(config: config::DaemonConfig, storage: storage::DaemonStorage) -> anyhow::Result<()> {
    let listener = server::bind(&config.socket_path)
        .with_context(|| format!("Could not open socket {}", config.socket_path.display()))?;
    info!(socket = %config.socket_path.display(), "Aether daemon listening");

    server::serve(listener, std::sync::Arc::new(storage)).await;
    Ok(())
}

#[cfg(not(unix))]
async fn run(_config: config::DaemonConfig, _storage: storage::DaemonStorage) -> anyhow::Result<()> {
    anyhow::bail!("aetherd requires Unix domain sockets")
}
