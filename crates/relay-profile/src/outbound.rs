//! Per-inbound client outbound construction.
//!
//! Every client-facing representation (full config, share URI, subscription)
//! derives from the same per-protocol field mapping so they never disagree.

use relay_types::{InboundWithNode, Protocol, User};
use serde_json::{json, Value};

/// Outbound tag shown in client apps: `{NodeName}-{InboundName}`.
pub fn outbound_tag(view: &InboundWithNode) -> String {
    format!("{}-{}", view.node.name, view.inbound.name)
}

/// Human-readable label used as the share URI fragment:
/// `{InboundName} - {NodeName}`.
pub fn display_label(view: &InboundWithNode) -> String {
    format!("{} - {}", view.inbound.name, view.node.name)
}

/// Build the client outbound object for one enabled inbound.
pub fn generate_outbound(user: &User, view: &InboundWithNode) -> Value {
    let tag = outbound_tag(view);
    match view.inbound.protocol {
        Protocol::Reality => reality_outbound(user, view, &tag),
        Protocol::WsTls => ws_tls_outbound(user, view, &tag),
        Protocol::Hysteria2 => hysteria2_outbound(user, view, &tag),
    }
}

fn reality_outbound(user: &User, view: &InboundWithNode, tag: &str) -> Value {
    let inbound = &view.inbound;
    json!({
        "type": "vless",
        "tag": tag,
        "server": view.node.address,
        "server_port": inbound.listen_port,
        "uuid": user.uuid.to_string(),
        "flow": "xtls-rprx-vision",
        "tls": {
            "enabled": true,
            "server_name": inbound.sni,
            "utls": {
                "enabled": true,
                "fingerprint": inbound.fingerprint,
            },
            "reality": {
                "enabled": true,
                "public_key": inbound.public_key,
                "short_id": inbound.short_id,
            },
        },
    })
}

fn ws_tls_outbound(user: &User, view: &InboundWithNode, tag: &str) -> Value {
    let inbound = &view.inbound;
    json!({
        "type": "vless",
        "tag": tag,
        "server": view.node.address,
        "server_port": inbound.listen_port,
        "uuid": user.uuid.to_string(),
        "tls": {
            "enabled": true,
            "server_name": inbound.sni,
            "utls": {
                "enabled": true,
                "fingerprint": inbound.fingerprint,
            },
        },
        "transport": {
            "type": "ws",
            "path": inbound.ws_path_or_default(),
            "headers": {
                "Host": inbound.sni,
            },
        },
    })
}

fn hysteria2_outbound(user: &User, view: &InboundWithNode, tag: &str) -> Value {
    let inbound = &view.inbound;
    json!({
        "type": "hysteria2",
        "tag": tag,
        "server": view.node.address,
        "server_port": inbound.listen_port,
        "password": user.uuid.to_string(),
        "up_mbps": inbound.up_mbps,
        "down_mbps": inbound.down_mbps,
        "tls": {
            "enabled": true,
            "server_name": inbound.sni,
            "insecure": false,
        },
    })
}
