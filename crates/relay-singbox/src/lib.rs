//! Server-side sing-box configuration templates for relay nodes.

pub mod error;
pub mod template;

pub use error::{Result, TemplateError};
pub use template::{
    generate_hysteria2_inbound, generate_inbound_block, generate_reality_inbound,
    generate_server_template, generate_ws_inbound, serialize_template, InboundBlock,
    ServerTemplate,
};
