//! Error types for reviewlens

/// Result type alias using reviewlens' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reviewlens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or unusable input data
    #[error("data error: {0}")]
    Data(String),

    /// Model fitting, prediction or persistence errors
    #[error("model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing and writing errors
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new data error
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
