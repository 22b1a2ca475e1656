//! Admin control plane: REST surface over the entity store, profile
//! generation and the node sync orchestrator.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::AdminConfig;
pub use error::{AdminError, Result};
pub use routes::router;
pub use state::AppState;
