use thiserror::Error;

/// Top-level error type for imsg.
#[derive(Debug, Error)]
pub enum ImsgError {
    /// A send provider failed in a way it could not report as a `SendResult`.
    #[error("provider error: {0}")]
    Provider(String),

    /// The script mechanism itself failed (spawn, non-zero exit, timeout).
    #[error("{0}")]
    Script(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Message store error.
    #[error("store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
