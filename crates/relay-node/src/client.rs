//! Typed HTTP client for the node agent wire protocol.
//!
//! Two deliberate error-handling paths coexist: `get_status` answers "is this
//! node reachable" and never errors — connectivity failure is a normal
//! offline observation. Every mutating call answers "did this command
//! succeed" and surfaces non-200 responses as hard errors carrying the
//! remote diagnostic text.

use std::time::Duration;

use chrono::{DateTime, Utc};
use relay_singbox::ServerTemplate;
use relay_types::Node;
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, Result};

pub const API_TOKEN_HEADER: &str = "X-API-Token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
// Container stop/start is not instantaneous
const RESTART_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatus {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub singbox_up: bool,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub uptime: i64,
    #[serde(default = "Utc::now")]
    pub last_checked: DateTime<Utc>,
}

impl NodeStatus {
    fn offline() -> Self {
        Self {
            online: false,
            singbox_up: false,
            version: String::new(),
            uptime: 0,
            last_checked: Utc::now(),
        }
    }

    fn online_unknown() -> Self {
        Self {
            online: true,
            ..Self::offline()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealityKeys {
    pub private_key: String,
    pub public_key: String,
    pub short_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTraffic {
    pub name: String,
    #[serde(default)]
    pub upload: i64,
    #[serde(default)]
    pub download: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStats {
    pub users: Vec<UserTraffic>,
}

#[derive(Clone, Default)]
pub struct NodeClient {
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    fn node_url(node: &Node, path: &str) -> String {
        format!("http://{}:{}{}", node.address, node.api_port, path)
    }

    fn get(&self, node: &Node, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(Self::node_url(node, path))
            .header(API_TOKEN_HEADER, &node.api_token)
            .timeout(DEFAULT_TIMEOUT)
    }

    fn post(&self, node: &Node, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(Self::node_url(node, path))
            .header(API_TOKEN_HEADER, &node.api_token)
            .timeout(DEFAULT_TIMEOUT)
    }

    async fn remote_error(
        operation: &'static str,
        response: reqwest::Response,
    ) -> NodeError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        NodeError::Remote {
            operation,
            status,
            body,
        }
    }

    /// Health check. Unreachable, timed out or non-200 all yield an offline
    /// status, never an error. A 200 with an undecodable body still counts
    /// as online.
    pub async fn get_status(&self, node: &Node) -> NodeStatus {
        let response = match self.get(node, "/health").send().await {
            Ok(response) => response,
            Err(_) => return NodeStatus::offline(),
        };
        if !response.status().is_success() {
            return NodeStatus::offline();
        }
        match response.json::<NodeStatus>().await {
            Ok(mut status) => {
                status.online = true;
                status.last_checked = Utc::now();
                status
            }
            Err(_) => NodeStatus::online_unknown(),
        }
    }

    /// Push a generated server config to the agent. The agent overwrites its
    /// config file; it does not restart the engine.
    pub async fn push_config(&self, node: &Node, template: &ServerTemplate) -> Result<()> {
        let response = self
            .post(node, "/config")
            .json(template)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::remote_error("push config", response).await);
        }
        Ok(())
    }

    /// Trigger the engine restart on the node. Attempted exactly once.
    pub async fn restart_singbox(&self, node: &Node) -> Result<()> {
        let response = self
            .post(node, "/restart")
            .timeout(RESTART_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::remote_error("restart", response).await);
        }
        Ok(())
    }

    /// Generate a fresh REALITY keypair + short-id on the node.
    pub async fn generate_keys(&self, node: &Node) -> Result<RealityKeys> {
        let response = self.post(node, "/generate-keys").send().await?;
        if !response.status().is_success() {
            return Err(Self::remote_error("generate keys", response).await);
        }
        response
            .json::<RealityKeys>()
            .await
            .map_err(|source| NodeError::Decode {
                operation: "generate keys",
                source,
            })
    }

    /// Per-user traffic counters from the engine's stats API.
    pub async fn get_stats(&self, node: &Node) -> Result<NodeStats> {
        let response = self.get(node, "/stats").send().await?;
        if !response.status().is_success() {
            return Err(Self::remote_error("stats", response).await);
        }
        response
            .json::<NodeStats>()
            .await
            .map_err(|source| NodeError::Decode {
                operation: "stats",
                source,
            })
    }

    /// Raw config currently stored on the node.
    pub async fn get_config(&self, node: &Node) -> Result<serde_json::Value> {
        let response = self.get(node, "/config").send().await?;
        if !response.status().is_success() {
            return Err(Self::remote_error("get config", response).await);
        }
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|source| NodeError::Decode {
                operation: "get config",
                source,
            })
    }
}
