use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
