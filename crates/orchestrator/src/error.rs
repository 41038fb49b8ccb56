//! Error types for chain orchestration.

use agent_tools::ToolError;
use oracle_core::OracleError;
use thiserror::Error;

/// Errors that can occur while building or running a chain.
///
/// Construction-time errors ([`ChainError::Planning`],
/// [`ChainError::Validation`]) abort before any step runs. Run-time errors
/// ([`ChainError::Resolution`], [`ChainError::Execution`],
/// [`ChainError::Gate`]) are scoped to one step: the runner converts them
/// into an inline `{error, alternative}` binding and continues the chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The oracle reply contained no parseable plan.
    #[error("planning failed: {0}")]
    Planning(String),

    /// A step references an unknown tool/function or the chain config is
    /// structurally malformed.
    #[error("chain validation failed: {0}")]
    Validation(String),

    /// A placeholder could not be resolved against the current context.
    #[error("could not resolve placeholder: {0}")]
    Resolution(String),

    /// The underlying tool call failed after exhausting retries.
    #[error("execution of {tool}.{function} failed: {source}")]
    Execution {
        tool: String,
        function: String,
        #[source]
        source: ToolError,
    },

    /// A condition could not be evaluated mechanically or by the oracle.
    #[error("condition evaluation failed: {0}")]
    Gate(String),

    /// Oracle failure outside per-step fallback handling (planning,
    /// response synthesis).
    #[error(transparent)]
    Oracle(#[from] OracleError),
}
