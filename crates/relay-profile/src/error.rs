use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("share link generation failed: {0}")]
    LinkGeneration(String),

    #[error("QR code generation failed: {0}")]
    QrCode(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
