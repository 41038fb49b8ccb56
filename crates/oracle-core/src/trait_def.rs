//! The Oracle trait definition.

use async_trait::async_trait;

use crate::error::OracleError;

/// A trait for natural-language completion backends.
///
/// Implementations can range from scripted test doubles to full LLM
/// backends. This trait is object-safe and can be used with
/// `Arc<dyn Oracle>`.
///
/// Callers must treat the returned text as unconstrained: the oracle gives
/// no grammar guarantees, so anything structural (JSON plans, yes/no
/// verdicts) has to be extracted defensively on the caller's side.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Complete a prompt and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;

    /// Get a human-readable name for this oracle implementation.
    fn name(&self) -> &str;

    /// Check if the oracle is ready to serve completions.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
