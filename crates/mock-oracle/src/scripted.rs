//! Scripted oracle implementation - replays a queue of replies.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use oracle_core::{Oracle, OracleError};

/// An oracle that returns queued replies in order.
///
/// Each call to `complete` pops the next reply. Once the queue is empty,
/// further calls fail with `OracleError::CompletionFailed`, which makes
/// over-consumption visible in tests. Prompts are recorded and can be
/// inspected afterward to assert on what the caller actually asked.
#[derive(Clone)]
pub struct ScriptedOracle {
    replies: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOracle {
    /// Create an oracle that replays `replies` in order.
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the prompts received so far, in order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    /// Number of replies not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().await.push(prompt.to_string());
        self.replies.lock().await.pop_front().ok_or_else(|| {
            OracleError::CompletionFailed("scripted replies exhausted".to_string())
        })
    }

    fn name(&self) -> &str {
        "ScriptedOracle"
    }
}
