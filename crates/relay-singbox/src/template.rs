//! Node-side sing-box server configuration document.
//!
//! This is the wire format pushed to node agents; the structs below must stay
//! loadable by the proxy engine running on the node.

use std::collections::HashMap;

use relay_types::{Inbound, Protocol, User};
use serde::Serialize;

use crate::error::Result;

pub const LISTEN_ALL: &str = "::";
pub const DEFAULT_MBPS: u32 = 100;
const REALITY_FALLBACK_PORT: u16 = 443;

#[derive(Debug, Clone, Serialize)]
pub struct ServerTemplate {
    pub log: LogSection,
    pub inbounds: Vec<InboundBlock>,
    pub outbounds: Vec<OutboundBlock>,
    pub route: RouteSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogSection {
    pub level: &'static str,
    pub timestamp: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundBlock {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tag: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteSection {
    pub r#final: &'static str,
}

/// One listener block. Untagged: each variant carries its own `type` field.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InboundBlock {
    Reality(RealityInbound),
    WsTls(WsInbound),
    Hysteria2(Hysteria2Inbound),
}

impl InboundBlock {
    pub fn tag(&self) -> &str {
        match self {
            InboundBlock::Reality(b) => &b.tag,
            InboundBlock::WsTls(b) => &b.tag,
            InboundBlock::Hysteria2(b) => &b.tag,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VlessUser {
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hysteria2User {
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RealityInbound {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tag: String,
    pub listen: &'static str,
    pub listen_port: u16,
    pub users: Vec<VlessUser>,
    pub tls: RealityTls,
}

#[derive(Debug, Clone, Serialize)]
pub struct RealityTls {
    pub enabled: bool,
    pub server_name: String,
    pub reality: RealitySettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct RealitySettings {
    pub enabled: bool,
    pub handshake: Handshake,
    pub private_key: String,
    /// The engine schema expects a list even for a single id
    pub short_id: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Handshake {
    pub server: String,
    pub server_port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct WsInbound {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tag: String,
    pub listen: &'static str,
    pub listen_port: u16,
    pub users: Vec<VlessUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<StandardTls>,
    pub transport: WsTransport,
}

#[derive(Debug, Clone, Serialize)]
pub struct StandardTls {
    pub enabled: bool,
    pub server_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub certificate_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WsTransport {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hysteria2Inbound {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tag: String,
    pub listen: &'static str,
    pub listen_port: u16,
    pub up_mbps: u32,
    pub down_mbps: u32,
    pub users: Vec<Hysteria2User>,
    pub tls: StandardTls,
}

fn block_tag(inbound: &Inbound) -> String {
    // Numeric id keeps tags unique even with duplicate inbound names
    format!("{}-{}", inbound.protocol.tag_prefix(), inbound.id)
}

/// VLESS + REALITY listener. The handshake target is where non-proxy TLS
/// clients are forwarded by the camouflage logic.
pub fn generate_reality_inbound(inbound: &Inbound, users: &[User]) -> RealityInbound {
    let vless_users = users
        .iter()
        .map(|u| VlessUser {
            uuid: u.uuid.to_string(),
            flow: Some("xtls-rprx-vision"),
        })
        .collect();

    let server = if inbound.fallback_addr.is_empty() {
        inbound.sni.clone()
    } else {
        inbound.fallback_addr.clone()
    };
    let server_port = if inbound.fallback_port == 0 {
        REALITY_FALLBACK_PORT
    } else {
        inbound.fallback_port
    };

    RealityInbound {
        kind: "vless",
        tag: block_tag(inbound),
        listen: LISTEN_ALL,
        listen_port: inbound.listen_port,
        users: vless_users,
        tls: RealityTls {
            enabled: true,
            server_name: inbound.sni.clone(),
            reality: RealitySettings {
                enabled: true,
                handshake: Handshake {
                    server,
                    server_port,
                },
                private_key: inbound.private_key.clone(),
                short_id: vec![inbound.short_id.clone()],
            },
        },
    }
}

/// VLESS + WebSocket listener. The TLS block appears only when both
/// certificate paths are configured; otherwise a reverse proxy terminates TLS
/// upstream and the listener stays plaintext behind it.
pub fn generate_ws_inbound(inbound: &Inbound, users: &[User]) -> WsInbound {
    let vless_users = users
        .iter()
        .map(|u| VlessUser {
            uuid: u.uuid.to_string(),
            flow: None,
        })
        .collect();

    let tls = inbound.has_certificate().then(|| StandardTls {
        enabled: true,
        server_name: inbound.sni.clone(),
        certificate_path: inbound.cert_path.clone(),
        key_path: inbound.key_path.clone(),
    });

    WsInbound {
        kind: "vless",
        tag: block_tag(inbound),
        listen: LISTEN_ALL,
        listen_port: inbound.listen_port,
        users: vless_users,
        tls,
        transport: WsTransport {
            kind: "ws",
            path: inbound.ws_path_or_default().to_string(),
        },
    }
}

/// Hysteria2 listener. TLS is mandatory for the protocol.
pub fn generate_hysteria2_inbound(inbound: &Inbound, users: &[User]) -> Hysteria2Inbound {
    let hy2_users = users
        .iter()
        .map(|u| Hysteria2User {
            password: u.uuid.to_string(),
        })
        .collect();

    let up_mbps = if inbound.up_mbps == 0 {
        DEFAULT_MBPS
    } else {
        inbound.up_mbps
    };
    let down_mbps = if inbound.down_mbps == 0 {
        DEFAULT_MBPS
    } else {
        inbound.down_mbps
    };

    Hysteria2Inbound {
        kind: "hysteria2",
        tag: block_tag(inbound),
        listen: LISTEN_ALL,
        listen_port: inbound.listen_port,
        up_mbps,
        down_mbps,
        users: hy2_users,
        tls: StandardTls {
            enabled: true,
            server_name: inbound.sni.clone(),
            certificate_path: inbound.cert_path.clone(),
            key_path: inbound.key_path.clone(),
        },
    }
}

/// Build a single inbound block, dispatching on the protocol variant.
pub fn generate_inbound_block(inbound: &Inbound, users: &[User]) -> InboundBlock {
    match inbound.protocol {
        Protocol::Reality => InboundBlock::Reality(generate_reality_inbound(inbound, users)),
        Protocol::WsTls => InboundBlock::WsTls(generate_ws_inbound(inbound, users)),
        Protocol::Hysteria2 => InboundBlock::Hysteria2(generate_hysteria2_inbound(inbound, users)),
    }
}

/// Full server config for one node. Disabled inbounds and inbounds with no
/// assigned users are omitted entirely: no point listening with no valid
/// credentials.
pub fn generate_server_template(
    inbounds: &[Inbound],
    users_by_inbound: &HashMap<u64, Vec<User>>,
) -> ServerTemplate {
    let blocks = inbounds
        .iter()
        .filter(|inbound| inbound.enabled)
        .filter_map(|inbound| {
            let users = users_by_inbound.get(&inbound.id)?;
            if users.is_empty() {
                return None;
            }
            Some(generate_inbound_block(inbound, users))
        })
        .collect();

    ServerTemplate {
        log: LogSection {
            level: "info",
            timestamp: true,
        },
        inbounds: blocks,
        outbounds: vec![
            OutboundBlock {
                kind: "direct",
                tag: "direct",
            },
            OutboundBlock {
                kind: "block",
                tag: "block",
            },
        ],
        route: RouteSection { r#final: "direct" },
    }
}

/// Canonical indented form for transmission and display.
pub fn serialize_template(template: &ServerTemplate) -> Result<String> {
    Ok(serde_json::to_string_pretty(template)?)
}
