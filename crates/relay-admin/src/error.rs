use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_node::NodeError;
use relay_profile::ProfileError;
use relay_store::StoreError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, AdminError>;

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::Store(err) | AdminError::Node(NodeError::Store(err)) => {
                store_response(err)
            }
            // Agent diagnostics pass through on the trusted admin boundary.
            AdminError::Node(err) => (StatusCode::BAD_GATEWAY, err.to_string()).into_response(),
            AdminError::Profile(err) => {
                error!(error = %err, "profile generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "generation failed").into_response()
            }
            AdminError::UnknownFormat(format) => (
                StatusCode::BAD_REQUEST,
                format!("unknown format: {format}"),
            )
                .into_response(),
        }
    }
}

fn store_response(err: StoreError) -> Response {
    let status = match &err {
        StoreError::NotFound { .. } | StoreError::UserNotFoundByCredential(_) => {
            StatusCode::NOT_FOUND
        }
        StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string()).into_response()
}
