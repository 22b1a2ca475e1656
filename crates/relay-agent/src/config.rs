use std::path::PathBuf;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9090";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sing-box/config.json";
pub const DEFAULT_ENGINE_API: &str = "http://127.0.0.1:9091";
pub const DEFAULT_CONTAINER: &str = "sing-box";

/// Agent settings, sourced from the environment.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Shared secret required on every call except /health.
    pub api_token: String,
    pub config_path: PathBuf,
    /// Base URL of the engine's stats API.
    pub engine_api: String,
    /// Container name passed to `docker restart`.
    pub container: String,
    pub listen_addr: String,
}

impl AgentConfig {
    /// The agent refuses to start without a token; an unset `API_TOKEN`
    /// would leave the config-write and restart surface open.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_token = std::env::var("API_TOKEN").unwrap_or_default();
        if api_token.is_empty() {
            anyhow::bail!("API_TOKEN must be set");
        }
        Ok(Self {
            api_token,
            config_path: std::env::var("SINGBOX_CONFIG")
                .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
                .into(),
            engine_api: std::env::var("SINGBOX_API")
                .unwrap_or_else(|_| DEFAULT_ENGINE_API.to_string()),
            container: std::env::var("SINGBOX_CONTAINER")
                .unwrap_or_else(|_| DEFAULT_CONTAINER.to_string()),
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string()),
        })
    }
}
