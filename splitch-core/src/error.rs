use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("hash verification failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("descriptor error: {0}")]
    Descriptor(String),

    #[error("timestamp error: {0}")]
    Timestamp(String),
}

impl SplitchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SplitchError::InvalidArgument(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        SplitchError::NotFound(msg.into())
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, SplitchError>;
