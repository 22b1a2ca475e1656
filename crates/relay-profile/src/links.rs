//! Share URIs and subscription payloads.
//!
//! The URI shapes are a wire contract with third-party client apps; the query
//! parameter value set per protocol is fixed, appended in one canonical order.

use base64::{engine::general_purpose::STANDARD, Engine};
use relay_types::{InboundWithNode, Protocol, User};
use url::Url;

use crate::error::{ProfileError, Result};
use crate::outbound::display_label;

/// Generate the share URI for one inbound (`vless://` or `hysteria2://`).
pub fn generate_share_url(user: &User, view: &InboundWithNode) -> Result<String> {
    match view.inbound.protocol {
        Protocol::Reality => reality_url(user, view),
        Protocol::WsTls => ws_tls_url(user, view),
        Protocol::Hysteria2 => hysteria2_url(user, view),
    }
}

fn base_url(scheme: &str, user: &User, view: &InboundWithNode) -> Result<Url> {
    Url::parse(&format!(
        "{}://{}@{}:{}",
        scheme,
        user.uuid,
        view.node.address,
        view.inbound.listen_port
    ))
    .map_err(|e| ProfileError::LinkGeneration(e.to_string()))
}

fn reality_url(user: &User, view: &InboundWithNode) -> Result<String> {
    let inbound = &view.inbound;
    let mut url = base_url("vless", user, view)?;
    url.query_pairs_mut()
        .append_pair("type", "tcp")
        .append_pair("security", "reality")
        .append_pair("sni", &inbound.sni)
        .append_pair("fp", &inbound.fingerprint)
        .append_pair("pbk", &inbound.public_key)
        .append_pair("sid", &inbound.short_id)
        .append_pair("flow", "xtls-rprx-vision");
    url.set_fragment(Some(&display_label(view)));
    Ok(url.to_string())
}

fn ws_tls_url(user: &User, view: &InboundWithNode) -> Result<String> {
    let inbound = &view.inbound;
    let mut url = base_url("vless", user, view)?;
    url.query_pairs_mut()
        .append_pair("type", "ws")
        .append_pair("security", "tls")
        .append_pair("sni", &inbound.sni)
        .append_pair("host", &inbound.sni)
        .append_pair("path", inbound.ws_path_or_default())
        .append_pair("fp", &inbound.fingerprint);
    url.set_fragment(Some(&display_label(view)));
    Ok(url.to_string())
}

fn hysteria2_url(user: &User, view: &InboundWithNode) -> Result<String> {
    let mut url = base_url("hysteria2", user, view)?;
    url.query_pairs_mut()
        .append_pair("sni", &view.inbound.sni);
    url.set_fragment(Some(&display_label(view)));
    Ok(url.to_string())
}

/// Share URIs for all enabled inbounds, in iteration order.
/// One inbound failing never aborts the others.
pub fn generate_all_share_urls(user: &User, inbounds: &[InboundWithNode]) -> Vec<String> {
    inbounds
        .iter()
        .filter(|view| view.inbound.enabled)
        .filter_map(|view| generate_share_url(user, view).ok())
        .collect()
}

/// Subscription payload: newline-joined share URIs, base64-encoded as one
/// opaque string.
pub fn generate_subscription(user: &User, inbounds: &[InboundWithNode]) -> String {
    let urls = generate_all_share_urls(user, inbounds);
    STANDARD.encode(urls.join("\n"))
}
