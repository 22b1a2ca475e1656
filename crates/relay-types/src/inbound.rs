use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::Protocol;

pub const DEFAULT_LISTEN_PORT: u16 = 443;
pub const DEFAULT_FINGERPRINT: &str = "chrome";
pub const DEFAULT_WS_PATH: &str = "/ws";

/// One listener configuration on a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inbound {
    pub id: u64,
    pub node_id: u64,
    pub name: String,
    pub protocol: Protocol,
    pub listen_port: u16,

    // TLS / REALITY
    #[serde(default)]
    pub sni: String,
    #[serde(default)]
    pub fallback_addr: String,
    #[serde(default)]
    pub fallback_port: u16,

    // REALITY keys
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub short_id: String,

    // Hysteria2 bandwidth caps
    #[serde(default)]
    pub up_mbps: u32,
    #[serde(default)]
    pub down_mbps: u32,

    // WebSocket
    #[serde(default)]
    pub ws_path: String,

    // Certificate paths (ws-tls and hysteria2)
    #[serde(default)]
    pub cert_path: String,
    #[serde(default)]
    pub key_path: String,

    /// uTLS fingerprint presented by clients
    pub fingerprint: String,

    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Inbound {
    pub fn new(id: u64, node_id: u64, name: String, protocol: Protocol) -> Self {
        let now = Utc::now();
        Self {
            id,
            node_id,
            name,
            protocol,
            listen_port: DEFAULT_LISTEN_PORT,
            sni: String::new(),
            fallback_addr: String::new(),
            fallback_port: 0,
            private_key: String::new(),
            public_key: String::new(),
            short_id: String::new(),
            up_mbps: 0,
            down_mbps: 0,
            ws_path: String::new(),
            cert_path: String::new(),
            key_path: String::new(),
            fingerprint: DEFAULT_FINGERPRINT.to_string(),
            enabled: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// WS path with the default applied
    pub fn ws_path_or_default(&self) -> &str {
        if self.ws_path.is_empty() {
            DEFAULT_WS_PATH
        } else {
            &self.ws_path
        }
    }

    /// Both certificate paths configured — the node terminates TLS itself
    pub fn has_certificate(&self) -> bool {
        !self.cert_path.is_empty() && !self.key_path.is_empty()
    }
}

/// Merge-semantics update for an inbound.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundPatch {
    pub name: Option<String>,
    pub listen_port: Option<u16>,
    pub sni: Option<String>,
    pub fallback_addr: Option<String>,
    pub fallback_port: Option<u16>,
    pub private_key: Option<String>,
    pub public_key: Option<String>,
    pub short_id: Option<String>,
    pub up_mbps: Option<u32>,
    pub down_mbps: Option<u32>,
    pub ws_path: Option<String>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    pub fingerprint: Option<String>,
    pub enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_path_default() {
        let mut inbound = Inbound::new(1, 1, "ws".to_string(), Protocol::WsTls);
        assert_eq!(inbound.ws_path_or_default(), "/ws");
        inbound.ws_path = "/tunnel".to_string();
        assert_eq!(inbound.ws_path_or_default(), "/tunnel");
    }

    #[test]
    fn test_has_certificate_requires_both_paths() {
        let mut inbound = Inbound::new(1, 1, "ws".to_string(), Protocol::WsTls);
        assert!(!inbound.has_certificate());
        inbound.cert_path = "/etc/certs/fullchain.pem".to_string();
        assert!(!inbound.has_certificate());
        inbound.key_path = "/etc/certs/privkey.pem".to_string();
        assert!(inbound.has_certificate());
    }
}
