//! Client-facing configuration generation: full sing-box client documents,
//! share URIs, subscription payloads and QR codes, all derived from the same
//! per-inbound outbound mapping.

pub mod client;
pub mod error;
pub mod links;
pub mod outbound;
pub mod qr;

pub use client::{generate_client_config, serialize_config};
pub use error::{ProfileError, Result};
pub use links::{generate_all_share_urls, generate_share_url, generate_subscription};
pub use outbound::{display_label, generate_outbound, outbound_tag};
pub use qr::{generate_qr_data_uri, generate_qr_svg};
