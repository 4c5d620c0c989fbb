//! Error types for finsight-core

use thiserror::Error;

/// Result type alias for finsight-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for assistant operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Component initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Processing a request failed
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    /// Capability arguments were missing or malformed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// An upstream data source was unavailable
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}
