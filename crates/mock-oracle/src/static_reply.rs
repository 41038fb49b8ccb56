//! Static oracle implementation - always returns the same reply.

use async_trait::async_trait;

use oracle_core::{Oracle, OracleError};

/// An oracle that returns a fixed reply for every prompt.
///
/// Useful for tests where only one oracle interaction happens, or where
/// the reply content does not matter.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    reply: String,
}

impl StaticOracle {
    /// Create an oracle that always replies with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl Oracle for StaticOracle {
    async fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "StaticOracle"
    }
}
