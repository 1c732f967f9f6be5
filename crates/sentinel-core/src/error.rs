//! Error types for Sentinel

/// Result type alias using Sentinel's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Sentinel operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors (invalid weights, bad rule tables)
    #[error("configuration error: {0}")]
    Config(String),

    /// Training errors (mismatched inputs, single-class corpus, empty vocabulary)
    #[error("training error: {0}")]
    Training(String),

    /// Persisted model is corrupt or inconsistent
    #[error("model error: {0}")]
    Model(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
