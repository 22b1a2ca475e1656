//! Inbound protocol variants shared across crates

use serde::{Deserialize, Serialize};

/// Listener protocol of an inbound. A closed set: adding a variant forces
/// every generator match to be extended at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    /// VLESS with REALITY TLS camouflage
    Reality,
    /// VLESS over WebSocket + TLS
    WsTls,
    /// Hysteria2 (UDP, TLS required)
    Hysteria2,
}

impl Protocol {
    /// Short name used in server config tags and share URI schemes
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Reality => "reality",
            Protocol::WsTls => "ws-tls",
            Protocol::Hysteria2 => "hysteria2",
        }
    }

    /// Tag prefix for node-side inbound blocks
    pub fn tag_prefix(&self) -> &'static str {
        match self {
            Protocol::Reality => "vless-reality",
            Protocol::WsTls => "vless-ws",
            Protocol::Hysteria2 => "hysteria2",
        }
    }

    /// Whether the node-side listener requires a TLS certificate pair
    pub fn requires_certificate(&self) -> bool {
        matches!(self, Protocol::Hysteria2)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reality" => Ok(Protocol::Reality),
            "ws-tls" => Ok(Protocol::WsTls),
            "hysteria2" => Ok(Protocol::Hysteria2),
            _ => Err(format!("unknown protocol: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_protocol_round_trip() {
        for p in [Protocol::Reality, Protocol::WsTls, Protocol::Hysteria2] {
            assert_eq!(Protocol::from_str(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        assert!(Protocol::from_str("vmess").is_err());
        assert!(Protocol::from_str("").is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Protocol::WsTls).unwrap(),
            "\"ws-tls\""
        );
        let p: Protocol = serde_json::from_str("\"hysteria2\"").unwrap();
        assert_eq!(p, Protocol::Hysteria2);
    }
}
