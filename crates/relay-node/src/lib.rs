//! Client side of the node agent protocol plus the sync orchestrator that
//! drives config rollout across the fleet.

pub mod client;
pub mod error;
pub mod sync;

pub use client::{NodeClient, NodeStats, NodeStatus, RealityKeys, UserTraffic, API_TOKEN_HEADER};
pub use error::{NodeError, Result};
pub use sync::{FleetEntry, SyncReport, SyncService, TrafficSummary};
