//! Error types for tool operations.

use thiserror::Error;

/// Errors that can occur during tool lookup and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool exists but does not expose the requested function.
    #[error("Function not found: {tool}.{function}")]
    FunctionNotFound { tool: String, function: String },

    /// Missing required parameter.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// General execution error.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl ToolError {
    /// Whether retrying the same call could plausibly succeed.
    ///
    /// Lookup and parameter errors are deterministic; network, upstream,
    /// and body-parsing failures may clear up on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ToolError::HttpError(_) | ToolError::JsonError(_) | ToolError::ExecutionFailed(_)
        )
    }
}
