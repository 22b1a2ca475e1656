use std::sync::Arc;
use std::time::Instant;

use tokio::process::Command;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::AgentConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AgentConfig>,
    pub http: reqwest::Client,
    pub started_at: Instant,
    /// Guards the config file: shared for reads, exclusive for writes.
    pub config_lock: Arc<RwLock<()>>,
    /// Engine version detected at startup, empty when the binary is absent.
    pub engine_version: String,
}

impl AppState {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            started_at: Instant::now(),
            config_lock: Arc::new(RwLock::new(())),
            engine_version: String::new(),
        }
    }

    pub async fn with_detected_version(config: AgentConfig) -> Self {
        let mut state = Self::new(config);
        state.engine_version = detect_engine_version().await;
        state
    }
}

/// First line of `sing-box version` looks like `sing-box version 1.8.0`.
async fn detect_engine_version() -> String {
    let output = match Command::new("sing-box").arg("version").output().await {
        Ok(output) if output.status.success() => output,
        _ => {
            debug!("sing-box binary not available, version unknown");
            return String::new();
        }
    };
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(2))
        .unwrap_or_default()
        .to_string()
}
