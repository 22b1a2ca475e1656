//! Shared entity model for the relay control plane.

pub mod inbound;
pub mod node;
pub mod protocol;
pub mod traffic;
pub mod user;
pub mod view;

pub use inbound::{Inbound, InboundPatch};
pub use node::{Node, NodePatch, NodeState};
pub use protocol::Protocol;
pub use traffic::TrafficSample;
pub use user::{User, UserPatch};
pub use view::InboundWithNode;
