//! Error types for the tracker calendar core.

use thiserror::Error;

/// Errors that can occur in tracker operations.
///
/// Per-source, per-master and per-event failures are isolated and reported
/// inside an [`Aggregation`](crate::aggregate::Aggregation) instead; only
/// failures of a whole operation surface through this type.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider rejected request: {message}")]
    ProviderRejected {
        message: String,
        /// HTTP-like status reported by the provider
        status: Option<u16>,
    },

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("No calendar sources configured")]
    NoSourcesConfigured,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;
