use tracing::info;

use relay_agent::{router, AgentConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relay_agent=debug".into()),
        )
        .init();

    let config = AgentConfig::from_env()?;
    let listen_addr = config.listen_addr.clone();
    let state = AppState::with_detected_version(config).await;
    let app = router(state);

    info!(addr = %listen_addr, "agent listening");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
