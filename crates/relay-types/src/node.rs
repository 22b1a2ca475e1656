use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AGENT_PORT: u16 = 9090;

/// A remote relay host running a node agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: u64,
    pub name: String,
    /// IP or domain of the host
    pub address: String,
    /// Port the node agent listens on
    pub api_port: u16,
    /// Shared secret for control-plane -> agent calls
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub api_token: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Node {
    pub fn new(id: u64, name: String, address: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            address,
            api_port: DEFAULT_AGENT_PORT,
            api_token: String::new(),
            enabled: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Reachability of a node as observed from the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Disabled,
    Online,
    Offline,
}

/// Merge-semantics update for a node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub api_port: Option<u16>,
    pub api_token: Option<String>,
    pub enabled: Option<bool>,
}
