use std::sync::Arc;

use anyhow::Context;
use speakease_backend::{
    config::Config,
    routes::create_router,
    services::completion::OpenAiClient,
    state::AppState,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    let addr = config.socket_addr()?;

    let client = OpenAiClient::new(&config.completion).context("failed to build completion client")?;
    info!(model = %client.model(), api_base = %config.completion.api_base, "completion client ready");

    let state = Arc::new(AppState::from_config(Arc::new(client), &config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("speakease backend listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
