use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("request to node failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node rejected {operation} (status {status}): {body}")]
    Remote {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("response decoding failed for {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Store(#[from] relay_store::StoreError),
}

pub type Result<T> = std::result::Result<T, NodeError>;
