//! On-host agent exposing the engine management API to the control plane.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use handlers::router;
pub use state::AppState;
