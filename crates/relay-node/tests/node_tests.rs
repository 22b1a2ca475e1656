use std::sync::Arc;

use relay_node::{NodeClient, NodeError, SyncService, API_TOKEN_HEADER};
use relay_store::{EntityStore, NewInbound, NewNode, NewUser};
use relay_types::{Node, NodeState};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn node_for(server: &MockServer) -> Node {
    let uri = url::Url::parse(&server.uri()).unwrap();
    let mut node = Node::new(1, "mock".into(), uri.host_str().unwrap().to_string());
    node.api_port = uri.port().unwrap();
    node.api_token = "secret".into();
    node
}

async fn store_with_mock_node(server: &MockServer) -> Arc<EntityStore> {
    let store = Arc::new(EntityStore::new());
    let uri = url::Url::parse(&server.uri()).unwrap();
    let node = store
        .create_node(NewNode {
            name: "mock".into(),
            address: uri.host_str().unwrap().to_string(),
            api_port: uri.port(),
            api_token: "secret".into(),
            enabled: None,
        })
        .unwrap();
    let inbound = store
        .create_inbound(
            node.id,
            NewInbound {
                name: "main".into(),
                protocol: "reality".into(),
                listen_port: Some(443),
                sni: "cdn.example.com".into(),
                fallback_addr: String::new(),
                fallback_port: 0,
                private_key: "PRIV".into(),
                public_key: "PUB".into(),
                short_id: "abcd1234".into(),
                up_mbps: 0,
                down_mbps: 0,
                ws_path: String::new(),
                cert_path: String::new(),
                key_path: String::new(),
                fingerprint: None,
                enabled: None,
            },
        )
        .unwrap();
    let second = store
        .create_inbound(
            node.id,
            NewInbound {
                name: "backup".into(),
                protocol: "ws-tls".into(),
                listen_port: Some(8443),
                sni: "web.example.com".into(),
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
            },
        )
        .unwrap();
    store
        .create_user(NewUser {
            name: "alice".into(),
            enabled: None,
            data_limit: 0,
            expires_at: None,
            inbound_ids: vec![inbound.id, second.id],
        })
        .unwrap();
    store
}

#[tokio::test]
async fn status_of_unreachable_node_is_offline_not_error() {
    // Nothing listens here.
    let mut node = Node::new(1, "gone".into(), "127.0.0.1".into());
    node.api_port = 1;

    let status = NodeClient::new().get_status(&node).await;
    assert!(!status.online);
    assert!(!status.singbox_up);
}

#[tokio::test]
async fn status_decodes_health_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header(API_TOKEN_HEADER, "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "online": true,
            "singbox_up": true,
            "version": "1.8.0",
            "uptime": 3600
        })))
        .mount(&server)
        .await;

    let status = NodeClient::new().get_status(&node_for(&server)).await;
    assert!(status.online);
    assert!(status.singbox_up);
    assert_eq!(status.version, "1.8.0");
    assert_eq!(status.uptime, 3600);
}

#[tokio::test]
async fn status_with_undecodable_body_still_counts_as_online() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let status = NodeClient::new().get_status(&node_for(&server)).await;
    assert!(status.online);
    assert!(!status.singbox_up);
}

#[tokio::test]
async fn push_config_surfaces_remote_diagnostics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(422).set_body_string("config invalid"))
        .mount(&server)
        .await;

    let template =
        relay_singbox::generate_server_template(&[], &std::collections::HashMap::new());
    let err = NodeClient::new()
        .push_config(&node_for(&server), &template)
        .await
        .unwrap_err();
    match err {
        NodeError::Remote { status, body, .. } => {
            assert_eq!(status, 422);
            assert_eq!(body, "config invalid");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_keys_decodes_keypair() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "private_key": "PRIV",
            "public_key": "PUB",
            "short_id": "0123abcd"
        })))
        .mount(&server)
        .await;

    let keys = NodeClient::new()
        .generate_keys(&node_for(&server))
        .await
        .unwrap();
    assert_eq!(keys.public_key, "PUB");
    assert_eq!(keys.short_id, "0123abcd");
}

#[tokio::test]
async fn sync_pushes_config_then_restarts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .and(header(API_TOKEN_HEADER, "secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/restart"))
        .and(header(API_TOKEN_HEADER, "secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with_mock_node(&server).await;
    let service = SyncService::new(store, NodeClient::new());
    let report = service.sync_node(1).await.unwrap();
    assert_eq!(report.node_name, "mock");
    assert_eq!(report.inbound_count, 2);

    // Restart runs detached; await it so the mock expectations settle.
    report.restart.await.unwrap();

    // The single pushed document carries both inbound blocks.
    let pushed = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.url.path() == "/config")
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&pushed.body).unwrap();
    assert_eq!(document["inbounds"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sync_aborts_when_push_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .mount(&server)
        .await;
    // No /restart mock: sync errors out before any restart is attempted.

    let store = store_with_mock_node(&server).await;
    let service = SyncService::new(store, NodeClient::new());
    let err = service.sync_node(1).await.unwrap_err();
    assert!(matches!(err, NodeError::Remote { status: 500, .. }));
}

#[tokio::test]
async fn traffic_collection_records_samples_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "users": [
                { "name": "alice", "upload": 100, "download": 900 },
                { "name": "ghost", "upload": 5, "download": 5 }
            ]
        })))
        .mount(&server)
        .await;

    let store = store_with_mock_node(&server).await;
    let service = SyncService::new(store.clone(), NodeClient::new());
    let summary = service.collect_traffic().await;

    assert_eq!(summary.nodes_polled, 1);
    // "ghost" matches no known user and is skipped.
    assert_eq!(summary.samples, 1);
    assert_eq!(summary.bytes, 1000);

    let alice = store.list_users(None, Some("alice")).remove(0);
    assert_eq!(alice.data_used, 1000);
    assert_eq!(store.traffic_totals(), (100, 900));
}

#[tokio::test]
async fn disabled_nodes_are_reported_without_contact() {
    let store = Arc::new(EntityStore::new());
    // Unroutable on purpose. fleet_statuses must not try to reach it.
    let node = store
        .create_node(NewNode {
            name: "paused".into(),
            address: "203.0.113.1".into(),
            api_port: None,
            api_token: String::new(),
            enabled: Some(false),
        })
        .unwrap();

    let service = SyncService::new(store, NodeClient::new());
    let entries = service.fleet_statuses().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].node_id, node.id);
    assert_eq!(entries[0].state, NodeState::Disabled);
    assert!(entries[0].status.is_none());
}
