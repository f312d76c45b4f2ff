use thiserror::Error;

/// Core error kinds. Empty input is not an error anywhere in this crate
/// family: normalizers and tokenizers return empty outputs, the embedder
/// returns a zero vector, and classification degrades to `other`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Learned model artifact is unavailable")]
    ModelUnavailable,

    #[error("Training failed: {0}")]
    TrainingFailure(String),

    #[error("Index inconsistency: {0}")]
    IndexInconsistency(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
