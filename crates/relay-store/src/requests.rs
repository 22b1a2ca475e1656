//! Creation requests accepted by the store (and deserialized by the admin API).

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub data_limit: i64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inbound_ids: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNode {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub api_port: Option<u16>,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInbound {
    pub name: String,
    /// Parsed against the closed protocol set; unknown values are rejected,
    /// never stored.
    pub protocol: String,
    #[serde(default)]
    pub listen_port: Option<u16>,
    #[serde(default)]
    pub sni: String,
    #[serde(default)]
    pub fallback_addr: String,
    #[serde(default)]
    pub fallback_port: u16,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub short_id: String,
    #[serde(default)]
    pub up_mbps: u32,
    #[serde(default)]
    pub down_mbps: u32,
    #[serde(default)]
    pub ws_path: String,
    #[serde(default)]
    pub cert_path: String,
    #[serde(default)]
    pub key_path: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}
