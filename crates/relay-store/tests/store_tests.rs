//! Integration tests for the entity store

use relay_store::{EntityStore, NewInbound, NewNode, NewUser, StoreError};
use relay_types::{InboundPatch, NodePatch, UserPatch};

fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        enabled: None,
        data_limit: 0,
        expires_at: None,
        inbound_ids: vec![],
    }
}

fn new_node(name: &str, address: &str) -> NewNode {
    NewNode {
        name: name.to_string(),
        address: address.to_string(),
        api_port: None,
        api_token: "secret".to_string(),
        enabled: None,
    }
}

fn new_inbound(name: &str, protocol: &str) -> NewInbound {
    NewInbound {
        name: name.to_string(),
        protocol: protocol.to_string(),
        listen_port: Some(443),
        sni: "cdn.example.com".to_string(),
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
        fingerprint: None,
        enabled: None,
    }
}

#[test]
fn test_user_lifecycle() {
    let store = EntityStore::new();
    let user = store.create_user(new_user("alice")).unwrap();
    assert!(user.enabled);
    assert!(!user.uuid.is_nil());

    // Duplicate name is rejected
    assert!(matches!(
        store.create_user(new_user("alice")),
        Err(StoreError::AlreadyExists { .. })
    ));

    // Soft delete hides the user from default queries
    store.delete_user(user.id).unwrap();
    assert!(store.get_user(user.id).is_err());
    assert!(store.list_users(None, None).is_empty());

    // The name is free again afterwards
    store.create_user(new_user("alice")).unwrap();
}

#[test]
fn test_user_merge_update() {
    let store = EntityStore::new();
    let user = store.create_user(new_user("bob")).unwrap();

    let updated = store
        .update_user(
            user.id,
            UserPatch {
                data_limit: Some(1024),
                ..Default::default()
            },
        )
        .unwrap();
    // Untouched fields survive the merge
    assert_eq!(updated.name, "bob");
    assert_eq!(updated.data_limit, 1024);
    assert_eq!(updated.uuid, user.uuid);
}

#[test]
fn test_node_merge_update_ignores_empty_fields() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();

    let updated = store
        .update_node(
            node.id,
            NodePatch {
                name: Some(String::new()),
                address: Some("5.6.7.8".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "node-A");
    assert_eq!(updated.address, "5.6.7.8");
}

#[test]
fn test_unknown_protocol_rejected_at_creation() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();

    let err = store
        .create_inbound(node.id, new_inbound("bad", "vmess"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "protocol", .. }));
    assert!(store.list_inbounds(Some(node.id)).is_empty());
}

#[test]
fn test_hysteria2_requires_certificate_paths() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();

    // Without a certificate pair the listener could never come up.
    let err = store
        .create_inbound(node.id, new_inbound("hy2", "hysteria2"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "cert_path", .. }));

    let mut req = new_inbound("hy2", "hysteria2");
    req.cert_path = "/etc/certs/fullchain.pem".to_string();
    req.key_path = "/etc/certs/privkey.pem".to_string();
    store.create_inbound(node.id, req).unwrap();
}

#[test]
fn test_inbound_merge_update_bumps_updated_at() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();
    let inbound = store
        .create_inbound(node.id, new_inbound("Tokyo-1", "reality"))
        .unwrap();

    let updated = store
        .update_inbound(
            inbound.id,
            InboundPatch {
                listen_port: Some(8443),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.listen_port, 8443);
    assert_eq!(updated.name, "Tokyo-1");
    assert!(updated.updated_at > inbound.updated_at);
    assert_eq!(updated.created_at, inbound.created_at);
}

#[test]
fn test_membership_assign_and_query() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();
    let i1 = store
        .create_inbound(node.id, new_inbound("Tokyo-1", "reality"))
        .unwrap();
    let i2 = store
        .create_inbound(node.id, new_inbound("Tokyo-2", "ws-tls"))
        .unwrap();
    let user = store.create_user(new_user("alice")).unwrap();

    store.assign_inbounds(user.id, &[i1.id, i2.id]).unwrap();
    assert_eq!(store.users_for_inbound(i1.id).len(), 1);

    let views = store.inbounds_for_user(user.id).unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].node.name, "node-A");

    // Replace semantics
    store.assign_inbounds(user.id, &[i2.id]).unwrap();
    assert!(store.users_for_inbound(i1.id).is_empty());
    assert_eq!(store.users_for_inbound(i2.id).len(), 1);
}

#[test]
fn test_user_delete_clears_membership() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();
    let inbound = store
        .create_inbound(node.id, new_inbound("Tokyo-1", "reality"))
        .unwrap();
    let user = store.create_user(new_user("alice")).unwrap();
    store.assign_inbounds(user.id, &[inbound.id]).unwrap();

    store.delete_user(user.id).unwrap();
    assert!(store.users_for_inbound(inbound.id).is_empty());
}

#[test]
fn test_inbound_delete_clears_membership() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();
    let inbound = store
        .create_inbound(node.id, new_inbound("Tokyo-1", "reality"))
        .unwrap();
    let user = store.create_user(new_user("alice")).unwrap();
    store.assign_inbounds(user.id, &[inbound.id]).unwrap();

    store.delete_inbound(inbound.id).unwrap();
    let views = store.inbounds_for_user(user.id).unwrap();
    assert!(views.is_empty());
}

#[test]
fn test_node_delete_cascades_to_inbounds() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();
    let inbound = store
        .create_inbound(node.id, new_inbound("Tokyo-1", "reality"))
        .unwrap();

    store.delete_node(node.id).unwrap();
    assert!(store.get_inbound(inbound.id).is_err());
    assert!(store.list_inbounds(None).is_empty());
}

#[test]
fn test_uuid_reset_rotates_credential() {
    let store = EntityStore::new();
    let user = store.create_user(new_user("alice")).unwrap();
    let rotated = store.reset_user_uuid(user.id).unwrap();
    assert_ne!(rotated, user.uuid);
    assert_eq!(store.get_user(user.id).unwrap().uuid, rotated);
}

#[test]
fn test_traffic_accounting() {
    let store = EntityStore::new();
    let node = store.create_node(new_node("node-A", "1.2.3.4")).unwrap();
    let inbound = store
        .create_inbound(node.id, new_inbound("Tokyo-1", "reality"))
        .unwrap();
    let alice = store.create_user(new_user("alice")).unwrap();
    let bob = store.create_user(new_user("bob")).unwrap();

    store.record_traffic(alice.id, inbound.id, 100, 900);
    store.record_traffic(bob.id, inbound.id, 10, 20);
    store.add_usage(alice.id, 1000).unwrap();
    store.add_usage(bob.id, 30).unwrap();

    assert_eq!(store.traffic_totals(), (110, 920));

    let top = store.top_users(1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "alice");

    let previous = store.reset_user_traffic(alice.id).unwrap();
    assert_eq!(previous, 1000);
    assert_eq!(store.get_user(alice.id).unwrap().data_used, 0);
}
