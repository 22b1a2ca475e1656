use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("config file not found")]
    ConfigMissing,

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("command `{command}` failed: {detail}")]
    Command { command: &'static str, detail: String },

    #[error("engine stats query failed: {0}")]
    Stats(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = match &self {
            AgentError::ConfigMissing => StatusCode::NOT_FOUND,
            AgentError::Serialize(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AgentError::Io(_) | AgentError::Command { .. } | AgentError::Stats(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
