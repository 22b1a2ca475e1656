use serde::Serialize;

use crate::{Inbound, Node};

/// An inbound with its owning node loaded. Client-facing generation needs the
/// node's public address and name next to the listener parameters.
#[derive(Debug, Clone, Serialize)]
pub struct InboundWithNode {
    pub inbound: Inbound,
    pub node: Node,
}
