//! Failing oracle implementation - every completion fails.

use async_trait::async_trait;

use oracle_core::{Oracle, OracleError};

/// An oracle whose completions always fail.
///
/// Useful for testing fallback paths when the oracle itself is down.
#[derive(Debug, Clone)]
pub struct FailingOracle {
    message: String,
}

impl FailingOracle {
    /// Create a failing oracle with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingOracle {
    fn default() -> Self {
        Self::new("oracle offline")
    }
}

#[async_trait]
impl Oracle for FailingOracle {
    async fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
        Err(OracleError::Unavailable(self.message.clone()))
    }

    fn name(&self) -> &str {
        "FailingOracle"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}
