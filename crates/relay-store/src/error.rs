use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: u64 },

    #[error("user not found: {0}")]
    UserNotFoundByCredential(String),

    #[error("{resource} already exists: {name}")]
    AlreadyExists { resource: &'static str, name: String },

    #[error("validation failed for {field}: {message}")]
    Validation { field: &'static str, message: String },
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
