use tracing::info;

use relay_admin::{router, AdminConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relay_admin=debug".into()),
        )
        .init();

    let config = AdminConfig::from_env()?;
    let listen_addr = config.listen_addr.clone();
    let app = router(AppState::new(config));

    info!(addr = %listen_addr, "control plane listening");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
