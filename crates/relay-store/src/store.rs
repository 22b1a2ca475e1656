use std::collections::HashSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use relay_types::{
    Inbound, InboundPatch, InboundWithNode, Node, NodePatch, Protocol, TrafficSample, User,
    UserPatch,
};

use crate::error::{Result, StoreError};
use crate::requests::{NewInbound, NewNode, NewUser};

/// In-process entity store with row-level atomicity per map entry.
///
/// Entities are soft-deleted: a `deleted_at` marker excludes them from every
/// default query but keeps the row. Deleting a user or inbound clears the
/// membership rows first so no dangling pairing survives.
pub struct EntityStore {
    users: DashMap<u64, User>,
    nodes: DashMap<u64, Node>,
    inbounds: DashMap<u64, Inbound>,
    /// user id -> assigned inbound ids
    memberships: DashMap<u64, HashSet<u64>>,
    traffic: DashMap<u64, TrafficSample>,
    next_user_id: AtomicU64,
    next_node_id: AtomicU64,
    next_inbound_id: AtomicU64,
    next_sample_id: AtomicU64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            nodes: DashMap::new(),
            inbounds: DashMap::new(),
            memberships: DashMap::new(),
            traffic: DashMap::new(),
            next_user_id: AtomicU64::new(1),
            next_node_id: AtomicU64::new(1),
            next_inbound_id: AtomicU64::new(1),
            next_sample_id: AtomicU64::new(1),
        }
    }

    // --- users ---

    pub fn create_user(&self, req: NewUser) -> Result<User> {
        if req.name.is_empty() {
            return Err(StoreError::validation("name", "user name is required"));
        }
        if self
            .users
            .iter()
            .any(|e| e.deleted_at.is_none() && e.name == req.name)
        {
            return Err(StoreError::AlreadyExists {
                resource: "user",
                name: req.name,
            });
        }

        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        let mut user = User::new(id, req.name);
        user.data_limit = req.data_limit;
        user.expires_at = req.expires_at;
        if let Some(enabled) = req.enabled {
            user.enabled = enabled;
        }
        self.users.insert(id, user.clone());

        if !req.inbound_ids.is_empty() {
            self.assign_inbounds(id, &req.inbound_ids)?;
        }
        Ok(user)
    }

    pub fn get_user(&self, id: u64) -> Result<User> {
        self.users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .map(|u| u.clone())
            .ok_or(StoreError::NotFound {
                resource: "user",
                id,
            })
    }

    /// Lookup by credential, used by the public subscription route.
    pub fn get_user_by_uuid(&self, uuid: &Uuid) -> Result<User> {
        self.users
            .iter()
            .find(|e| e.deleted_at.is_none() && e.uuid == *uuid)
            .map(|e| e.clone())
            .ok_or_else(|| StoreError::UserNotFoundByCredential(uuid.to_string()))
    }

    pub fn list_users(&self, enabled: Option<bool>, search: Option<&str>) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|e| e.deleted_at.is_none())
            .filter(|e| enabled.map(|want| e.enabled == want).unwrap_or(true))
            .filter(|e| {
                search
                    .map(|s| e.name.to_lowercase().contains(&s.to_lowercase()))
                    .unwrap_or(true)
            })
            .map(|e| e.clone())
            .collect();
        users.sort_by_key(|u| u.id);
        users
    }

    pub fn update_user(&self, id: u64, patch: UserPatch) -> Result<User> {
        if let Some(name) = patch.name.as_deref() {
            if !name.is_empty()
                && self
                    .users
                    .iter()
                    .any(|e| e.deleted_at.is_none() && e.id != id && e.name == name)
            {
                return Err(StoreError::AlreadyExists {
                    resource: "user",
                    name: name.to_string(),
                });
            }
        }

        let updated = {
            let mut entry = self
                .users
                .get_mut(&id)
                .filter(|u| u.deleted_at.is_none())
                .ok_or(StoreError::NotFound {
                    resource: "user",
                    id,
                })?;
            if let Some(name) = patch.name {
                if !name.is_empty() {
                    entry.name = name;
                }
            }
            if let Some(enabled) = patch.enabled {
                entry.enabled = enabled;
            }
            if let Some(limit) = patch.data_limit {
                if limit >= 0 {
                    entry.data_limit = limit;
                }
            }
            if let Some(expires) = patch.expires_at {
                entry.expires_at = Some(expires);
            }
            entry.updated_at = Utc::now();
            entry.clone()
        };

        if let Some(ids) = patch.inbound_ids {
            self.assign_inbounds(id, &ids)?;
        }
        Ok(updated)
    }

    pub fn delete_user(&self, id: u64) -> Result<()> {
        // Membership rows go first, then the soft-delete marker.
        self.memberships.remove(&id);
        let mut entry = self
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound {
                resource: "user",
                id,
            })?;
        entry.deleted_at = Some(Utc::now());
        Ok(())
    }

    /// Credential rotation. Every node serving this user must be resynced
    /// afterwards or the user loses access.
    pub fn reset_user_uuid(&self, id: u64) -> Result<Uuid> {
        let mut entry = self
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound {
                resource: "user",
                id,
            })?;
        entry.uuid = Uuid::new_v4();
        entry.updated_at = Utc::now();
        Ok(entry.uuid)
    }

    /// Zero the usage counter, returning the previous value.
    pub fn reset_user_traffic(&self, id: u64) -> Result<i64> {
        let mut entry = self
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound {
                resource: "user",
                id,
            })?;
        let previous = entry.data_used;
        entry.data_used = 0;
        entry.updated_at = Utc::now();
        Ok(previous)
    }

    pub fn add_usage(&self, id: u64, bytes: i64) -> Result<()> {
        let mut entry = self
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound {
                resource: "user",
                id,
            })?;
        entry.data_used += bytes;
        Ok(())
    }

    // --- nodes ---

    pub fn create_node(&self, req: NewNode) -> Result<Node> {
        if req.name.is_empty() {
            return Err(StoreError::validation("name", "node name is required"));
        }
        if req.address.is_empty() {
            return Err(StoreError::validation("address", "node address is required"));
        }

        let id = self.next_node_id.fetch_add(1, Ordering::SeqCst);
        let mut node = Node::new(id, req.name, req.address);
        if let Some(port) = req.api_port {
            node.api_port = port;
        }
        node.api_token = req.api_token;
        if let Some(enabled) = req.enabled {
            node.enabled = enabled;
        }
        self.nodes.insert(id, node.clone());
        Ok(node)
    }

    pub fn get_node(&self, id: u64) -> Result<Node> {
        self.nodes
            .get(&id)
            .filter(|n| n.deleted_at.is_none())
            .map(|n| n.clone())
            .ok_or(StoreError::NotFound {
                resource: "node",
                id,
            })
    }

    pub fn list_nodes(&self, enabled: Option<bool>) -> Vec<Node> {
        let mut nodes: Vec<Node> = self
            .nodes
            .iter()
            .filter(|e| e.deleted_at.is_none())
            .filter(|e| enabled.map(|want| e.enabled == want).unwrap_or(true))
            .map(|e| e.clone())
            .collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    pub fn update_node(&self, id: u64, patch: NodePatch) -> Result<Node> {
        let mut entry = self
            .nodes
            .get_mut(&id)
            .filter(|n| n.deleted_at.is_none())
            .ok_or(StoreError::NotFound {
                resource: "node",
                id,
            })?;
        if let Some(name) = patch.name {
            if !name.is_empty() {
                entry.name = name;
            }
        }
        if let Some(address) = patch.address {
            if !address.is_empty() {
                entry.address = address;
            }
        }
        if let Some(port) = patch.api_port {
            if port > 0 {
                entry.api_port = port;
            }
        }
        if let Some(token) = patch.api_token {
            if !token.is_empty() {
                entry.api_token = token;
            }
        }
        if let Some(enabled) = patch.enabled {
            entry.enabled = enabled;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Soft-deletes the node and cascades to its inbounds so they are never
    /// silently served again.
    pub fn delete_node(&self, id: u64) -> Result<()> {
        {
            let mut entry = self
                .nodes
                .get_mut(&id)
                .filter(|n| n.deleted_at.is_none())
                .ok_or(StoreError::NotFound {
                    resource: "node",
                    id,
                })?;
            entry.deleted_at = Some(Utc::now());
        }

        let owned: Vec<u64> = self
            .inbounds
            .iter()
            .filter(|e| e.deleted_at.is_none() && e.node_id == id)
            .map(|e| e.id)
            .collect();
        for inbound_id in owned {
            let _ = self.delete_inbound(inbound_id);
        }
        Ok(())
    }

    // --- inbounds ---

    pub fn create_inbound(&self, node_id: u64, req: NewInbound) -> Result<Inbound> {
        self.get_node(node_id)?;
        if req.name.is_empty() {
            return Err(StoreError::validation("name", "inbound name is required"));
        }
        let protocol = Protocol::from_str(&req.protocol)
            .map_err(|e| StoreError::validation("protocol", e))?;
        if protocol.requires_certificate() && (req.cert_path.is_empty() || req.key_path.is_empty())
        {
            return Err(StoreError::validation(
                "cert_path",
                format!("{} requires cert_path and key_path", protocol),
            ));
        }

        let id = self.next_inbound_id.fetch_add(1, Ordering::SeqCst);
        let mut inbound = Inbound::new(id, node_id, req.name, protocol);
        if let Some(port) = req.listen_port {
            inbound.listen_port = port;
        }
        inbound.sni = req.sni;
        inbound.fallback_addr = req.fallback_addr;
        inbound.fallback_port = req.fallback_port;
        inbound.private_key = req.private_key;
        inbound.public_key = req.public_key;
        inbound.short_id = req.short_id;
        inbound.up_mbps = req.up_mbps;
        inbound.down_mbps = req.down_mbps;
        inbound.ws_path = req.ws_path;
        inbound.cert_path = req.cert_path;
        inbound.key_path = req.key_path;
        if let Some(fp) = req.fingerprint {
            if !fp.is_empty() {
                inbound.fingerprint = fp;
            }
        }
        if let Some(enabled) = req.enabled {
            inbound.enabled = enabled;
        }
        self.inbounds.insert(id, inbound.clone());
        Ok(inbound)
    }

    pub fn get_inbound(&self, id: u64) -> Result<Inbound> {
        self.inbounds
            .get(&id)
            .filter(|i| i.deleted_at.is_none())
            .map(|i| i.clone())
            .ok_or(StoreError::NotFound {
                resource: "inbound",
                id,
            })
    }

    pub fn list_inbounds(&self, node_id: Option<u64>) -> Vec<Inbound> {
        let mut inbounds: Vec<Inbound> = self
            .inbounds
            .iter()
            .filter(|e| e.deleted_at.is_none())
            .filter(|e| node_id.map(|n| e.node_id == n).unwrap_or(true))
            .map(|e| e.clone())
            .collect();
        inbounds.sort_by_key(|i| i.id);
        inbounds
    }

    pub fn update_inbound(&self, id: u64, patch: InboundPatch) -> Result<Inbound> {
        let mut entry = self
            .inbounds
            .get_mut(&id)
            .filter(|i| i.deleted_at.is_none())
            .ok_or(StoreError::NotFound {
                resource: "inbound",
                id,
            })?;
        if let Some(name) = patch.name {
            if !name.is_empty() {
                entry.name = name;
            }
        }
        if let Some(port) = patch.listen_port {
            if port > 0 {
                entry.listen_port = port;
            }
        }
        if let Some(sni) = patch.sni {
            if !sni.is_empty() {
                entry.sni = sni;
            }
        }
        if let Some(addr) = patch.fallback_addr {
            entry.fallback_addr = addr;
        }
        if let Some(port) = patch.fallback_port {
            entry.fallback_port = port;
        }
        if let Some(key) = patch.private_key {
            if !key.is_empty() {
                entry.private_key = key;
            }
        }
        if let Some(key) = patch.public_key {
            if !key.is_empty() {
                entry.public_key = key;
            }
        }
        if let Some(sid) = patch.short_id {
            if !sid.is_empty() {
                entry.short_id = sid;
            }
        }
        if let Some(mbps) = patch.up_mbps {
            entry.up_mbps = mbps;
        }
        if let Some(mbps) = patch.down_mbps {
            entry.down_mbps = mbps;
        }
        if let Some(path) = patch.ws_path {
            entry.ws_path = path;
        }
        if let Some(path) = patch.cert_path {
            entry.cert_path = path;
        }
        if let Some(path) = patch.key_path {
            entry.key_path = path;
        }
        if let Some(fp) = patch.fingerprint {
            if !fp.is_empty() {
                entry.fingerprint = fp;
            }
        }
        if let Some(enabled) = patch.enabled {
            entry.enabled = enabled;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    pub fn delete_inbound(&self, id: u64) -> Result<()> {
        // Clear every membership row referencing this inbound first.
        for mut entry in self.memberships.iter_mut() {
            entry.value_mut().remove(&id);
        }
        let mut entry = self
            .inbounds
            .get_mut(&id)
            .filter(|i| i.deleted_at.is_none())
            .ok_or(StoreError::NotFound {
                resource: "inbound",
                id,
            })?;
        entry.deleted_at = Some(Utc::now());
        Ok(())
    }

    // --- membership ---

    /// Replace semantics: the user's assignment set becomes exactly `inbound_ids`.
    pub fn assign_inbounds(&self, user_id: u64, inbound_ids: &[u64]) -> Result<()> {
        self.get_user(user_id)?;
        let mut set = HashSet::new();
        for &id in inbound_ids {
            self.get_inbound(id)?;
            set.insert(id);
        }
        self.memberships.insert(user_id, set);
        Ok(())
    }

    /// Non-deleted users assigned to an inbound, in id order.
    pub fn users_for_inbound(&self, inbound_id: u64) -> Vec<User> {
        let mut users: Vec<User> = self
            .memberships
            .iter()
            .filter(|e| e.value().contains(&inbound_id))
            .filter_map(|e| self.get_user(*e.key()).ok())
            .collect();
        users.sort_by_key(|u| u.id);
        users
    }

    /// The user's assigned inbounds with their owning nodes loaded, in id order.
    /// Inbounds whose node is gone are skipped.
    pub fn inbounds_for_user(&self, user_id: u64) -> Result<Vec<InboundWithNode>> {
        self.get_user(user_id)?;
        let ids: Vec<u64> = self
            .memberships
            .get(&user_id)
            .map(|set| {
                let mut v: Vec<u64> = set.iter().copied().collect();
                v.sort_unstable();
                v
            })
            .unwrap_or_default();

        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            let Ok(inbound) = self.get_inbound(id) else {
                continue;
            };
            let Ok(node) = self.get_node(inbound.node_id) else {
                continue;
            };
            result.push(InboundWithNode { inbound, node });
        }
        Ok(result)
    }

    // --- traffic ---

    pub fn record_traffic(
        &self,
        user_id: u64,
        inbound_id: u64,
        upload: i64,
        download: i64,
    ) -> TrafficSample {
        let id = self.next_sample_id.fetch_add(1, Ordering::SeqCst);
        let sample = TrafficSample {
            id,
            user_id,
            inbound_id,
            upload,
            download,
            recorded_at: Utc::now(),
        };
        self.traffic.insert(id, sample.clone());
        sample
    }

    /// Fleet-wide (upload, download) totals over all recorded samples.
    pub fn traffic_totals(&self) -> (i64, i64) {
        self.traffic
            .iter()
            .fold((0, 0), |(up, down), s| (up + s.upload, down + s.download))
    }

    /// Top users by cumulative usage counter, descending.
    pub fn top_users(&self, limit: usize) -> Vec<User> {
        let mut users = self.list_users(None, None);
        users.sort_by(|a, b| b.data_used.cmp(&a.data_used));
        users.truncate(limit);
        users
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.list_users(None, None).len(),
            self.list_nodes(None).len(),
            self.list_inbounds(None).len(),
        )
    }
}
