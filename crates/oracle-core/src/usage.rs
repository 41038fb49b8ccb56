//! Tool usage records shared between the orchestrator and memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One executed tool invocation, as recorded for later context building.
///
/// The orchestrator emits exactly one record per executed (non-skipped)
/// chain step. Consumers never feed records back into the run that
/// produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Tool name that was invoked.
    pub tool: String,
    /// Function name within the tool.
    pub function: String,
    /// Resolved arguments the function was called with.
    pub arguments: Value,
    /// Result of the invocation, stored opaquely.
    pub result: Value,
    /// When the invocation completed.
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    /// Create a record stamped with the current time.
    pub fn now(
        tool: impl Into<String>,
        function: impl Into<String>,
        arguments: Value,
        result: Value,
    ) -> Self {
        Self {
            tool: tool.into(),
            function: function.into(),
            arguments,
            result,
            timestamp: Utc::now(),
        }
    }
}

/// A sink for tool usage records.
///
/// Implemented by [`crate::ConversationMemory`]; other collaborators
/// (databases, log shippers) can implement it as well.
#[async_trait]
pub trait UsageSink: Send + Sync {
    /// Record one executed tool invocation.
    async fn record_usage(&self, record: UsageRecord);
}
