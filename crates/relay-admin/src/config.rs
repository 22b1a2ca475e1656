pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Control plane settings, sourced from the environment.
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    /// Static bearer token for the /api surface.
    pub admin_token: String,
    /// Optional shared secret gating the public subscription endpoint
    /// (checked against the `key` query parameter).
    pub sub_password: Option<String>,
    pub listen_addr: String,
}

impl AdminConfig {
    /// The control plane refuses to start without a token; an unset
    /// `ADMIN_TOKEN` would leave the whole /api surface open.
    pub fn from_env() -> anyhow::Result<Self> {
        let admin_token = std::env::var("ADMIN_TOKEN").unwrap_or_default();
        if admin_token.is_empty() {
            anyhow::bail!("ADMIN_TOKEN must be set");
        }
        Ok(Self {
            admin_token,
            sub_password: std::env::var("SUB_PASSWORD").ok().filter(|s| !s.is_empty()),
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string()),
        })
    }
}
