//! Sync orchestration: regenerate a node's server config from the current
//! store state and push it to the agent.
//!
//! The push is the critical step and failures abort the sync. The restart
//! that follows is fire-and-forget: it runs on a detached task and its
//! outcome is only logged, so a slow container bounce never blocks the
//! caller.

use std::collections::HashMap;
use std::sync::Arc;

use relay_singbox::generate_server_template;
use relay_store::EntityStore;
use relay_types::{Node, NodeState};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::client::{NodeClient, NodeStatus};
use crate::error::Result;

#[derive(Debug)]
pub struct SyncReport {
    pub node_id: u64,
    pub node_name: String,
    pub inbound_count: usize,
    /// Handle of the detached restart task. Dropping it is fine; awaiting it
    /// observes restart completion.
    pub restart: JoinHandle<()>,
}

/// Outcome of one traffic collection pass.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TrafficSummary {
    pub nodes_polled: usize,
    pub samples: usize,
    pub bytes: i64,
}

/// A node's status as seen from the control plane.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FleetEntry {
    pub node_id: u64,
    pub node_name: String,
    pub state: NodeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
}

#[derive(Clone)]
pub struct SyncService {
    store: Arc<EntityStore>,
    client: NodeClient,
}

impl SyncService {
    pub fn new(store: Arc<EntityStore>, client: NodeClient) -> Self {
        Self { store, client }
    }

    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    /// Regenerate and push the config for one node, then kick off a restart
    /// in the background.
    pub async fn sync_node(&self, node_id: u64) -> Result<SyncReport> {
        let node = self.store.get_node(node_id)?;
        let inbounds = self.store.list_inbounds(Some(node_id));

        let mut users_by_inbound = HashMap::with_capacity(inbounds.len());
        for inbound in &inbounds {
            users_by_inbound.insert(inbound.id, self.store.users_for_inbound(inbound.id));
        }
        let inbound_count = inbounds
            .iter()
            .filter(|inbound| {
                inbound.enabled
                    && users_by_inbound
                        .get(&inbound.id)
                        .is_some_and(|users| !users.is_empty())
            })
            .count();

        let template = generate_server_template(&inbounds, &users_by_inbound);
        self.client.push_config(&node, &template).await?;
        info!(
            node = %node.name,
            inbounds = inbound_count,
            "config pushed"
        );

        let restart = self.spawn_restart(node.clone());
        Ok(SyncReport {
            node_id: node.id,
            node_name: node.name,
            inbound_count,
            restart,
        })
    }

    /// Sync every enabled node. Per-node failures are logged and skipped so
    /// one unreachable node does not block the rest of the fleet.
    pub async fn sync_all(&self) -> Vec<SyncReport> {
        let nodes = self.store.list_nodes(Some(true));
        let mut reports = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.sync_node(node.id).await {
                Ok(report) => reports.push(report),
                Err(err) => warn!(node = %node.name, error = %err, "sync failed"),
            }
        }
        reports
    }

    /// Status of the whole fleet. Disabled nodes are reported as such
    /// without a network round trip.
    pub async fn fleet_statuses(&self) -> Vec<FleetEntry> {
        let nodes = self.store.list_nodes(None);
        let mut entries = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !node.enabled {
                entries.push(FleetEntry {
                    node_id: node.id,
                    node_name: node.name,
                    state: NodeState::Disabled,
                    status: None,
                });
                continue;
            }
            let status = self.client.get_status(&node).await;
            let state = if status.online {
                NodeState::Online
            } else {
                NodeState::Offline
            };
            entries.push(FleetEntry {
                node_id: node.id,
                node_name: node.name,
                state,
                status: Some(status),
            });
        }
        entries
    }

    /// Pull per-user traffic counters from every enabled node and fold them
    /// into the store as samples plus cumulative usage. Counters are deltas
    /// since the previous poll. Unreachable nodes and unknown user names are
    /// skipped.
    pub async fn collect_traffic(&self) -> TrafficSummary {
        let users_by_name: HashMap<String, u64> = self
            .store
            .list_users(None, None)
            .into_iter()
            .map(|user| (user.name, user.id))
            .collect();

        let mut summary = TrafficSummary::default();
        for node in self.store.list_nodes(Some(true)) {
            let stats = match self.client.get_stats(&node).await {
                Ok(stats) => stats,
                Err(err) => {
                    warn!(node = %node.name, error = %err, "stats poll failed");
                    continue;
                }
            };
            summary.nodes_polled += 1;
            for counter in stats.users {
                let Some(&user_id) = users_by_name.get(&counter.name) else {
                    continue;
                };
                let inbound_id = self
                    .store
                    .inbounds_for_user(user_id)
                    .ok()
                    .and_then(|pairs| {
                        pairs
                            .into_iter()
                            .find(|pair| pair.node.id == node.id)
                            .map(|pair| pair.inbound.id)
                    })
                    .unwrap_or(0);
                self.store
                    .record_traffic(user_id, inbound_id, counter.upload, counter.download);
                let _ = self
                    .store
                    .add_usage(user_id, counter.upload + counter.download);
                summary.samples += 1;
                summary.bytes += counter.upload + counter.download;
            }
        }
        summary
    }

    fn spawn_restart(&self, node: Node) -> JoinHandle<()> {
        let client = self.client.clone();
        tokio::spawn(async move {
            match client.restart_singbox(&node).await {
                Ok(()) => info!(node = %node.name, "engine restarted"),
                Err(err) => error!(node = %node.name, error = %err, "restart failed"),
            }
        })
    }
}
