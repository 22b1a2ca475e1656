//! Full client-side sing-box configuration document.

use relay_types::{InboundWithNode, User};
use serde_json::{json, Value};

use crate::error::Result;
use crate::outbound::generate_outbound;

/// Generate the complete importable client config for a user.
///
/// Disabled inbounds contribute nothing. With several servers a `selector`
/// outbound tagged `proxy` is prepended; with exactly one, that outbound is
/// retagged `proxy` so the routing default resolves.
pub fn generate_client_config(user: &User, inbounds: &[InboundWithNode]) -> Result<Value> {
    let mut outbounds: Vec<Value> = inbounds
        .iter()
        .filter(|view| view.inbound.enabled)
        .map(|view| generate_outbound(user, view))
        .collect();

    if outbounds.len() > 1 {
        let tags: Vec<String> = outbounds
            .iter()
            .filter_map(|ob| ob["tag"].as_str().map(str::to_string))
            .collect();
        let selector = json!({
            "type": "selector",
            "tag": "proxy",
            "outbounds": tags,
            "default": tags[0],
        });
        outbounds.insert(0, selector);
    } else if outbounds.len() == 1 {
        outbounds[0]["tag"] = Value::String("proxy".to_string());
    }

    outbounds.push(json!({"type": "direct", "tag": "direct"}));
    outbounds.push(json!({"type": "block", "tag": "block"}));
    outbounds.push(json!({"type": "dns", "tag": "dns-out"}));

    Ok(json!({
        "log": {
            "level": "info",
            "timestamp": true,
        },
        "dns": {
            "servers": [
                {"tag": "proxy-dns", "address": "8.8.8.8", "detour": "proxy"},
                {"tag": "direct-dns", "address": "8.8.8.8", "detour": "direct"},
            ],
            "rules": [
                {"outbound": "any", "server": "direct-dns"},
            ],
            "final": "proxy-dns",
            "strategy": "prefer_ipv4",
        },
        "inbounds": [
            {
                "type": "tun",
                "tag": "tun-in",
                "interface_name": "tun0",
                "inet4_address": "172.19.0.1/30",
                "mtu": 9000,
                "auto_route": true,
                "strict_route": true,
                "stack": "system",
                "sniff": true,
                "sniff_override_destination": true,
            },
        ],
        "outbounds": outbounds,
        "route": {
            "auto_detect_interface": true,
            "final": "proxy",
            "rules": [
                {"protocol": "dns", "outbound": "dns-out"},
                {"geoip": ["private"], "outbound": "direct"},
                {"geosite": ["category-ads-all"], "outbound": "block"},
            ],
        },
    }))
}

/// Canonical indented form for display and download.
pub fn serialize_config(config: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
