//! Error types for oracle operations.

use thiserror::Error;

/// Errors that can occur during oracle completion.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle endpoint is temporarily unavailable.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The prompt could not be completed.
    #[error("completion failed: {0}")]
    CompletionFailed(String),

    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A timeout occurred while waiting for the oracle.
    #[error("completion timed out")]
    Timeout,
}
