use anyhow::Context;
use server::config::AppConfig;
use server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    config
        .data
        .ensure_directories()
        .await
        .context("Failed to create data directories")?;

    let state = AppState::new(config.clone())
        .await
        .context("Failed to load scene index")?;
    info!(
        name = %state.node.name,
        id = %state.node.id,
        color = state.node.color.name,
        scenes = state.scenes.len().await,
        "Node starting"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, server::build_router(state)).await?;
    Ok(())
}
