//! Delayed oracle implementation - wraps another oracle with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use oracle_core::{Oracle, OracleError};

/// An oracle that wraps another oracle and adds artificial delay.
///
/// Useful for testing latency behavior and simulating model inference time.
pub struct DelayedOracle<O: Oracle> {
    inner: O,
    delay: Duration,
}

impl<O: Oracle> DelayedOracle<O> {
    /// Create a new DelayedOracle wrapping `inner` with the specified delay.
    pub fn new(inner: O, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create an oracle with a delay in milliseconds.
    pub fn with_millis(inner: O, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<O: Oracle> Oracle for DelayedOracle<O> {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        sleep(self.delay).await;
        self.inner.complete(prompt).await
    }

    fn name(&self) -> &str {
        "DelayedOracle"
    }

    async fn is_ready(&self) -> bool {
        self.inner.is_ready().await
    }
}
