//! Conversation memory: rolling history and recent tool usage.
//!
//! This module keeps the short-term state of one conversation: the last N
//! user/assistant turns plus a small ring of recent tool usages. The
//! orchestrator writes usage records here through the [`UsageSink`] trait
//! and the front end reads formatted context for prompt building.

use tokio::sync::RwLock;

use async_trait::async_trait;

use crate::usage::{UsageRecord, UsageSink};

/// Default maximum number of messages kept in history.
const DEFAULT_MAX_MESSAGES: usize = 10;

/// Maximum number of recent tool usages kept.
const MAX_RECENT_USAGES: usize = 5;

/// A single message in the conversation history.
#[derive(Debug, Clone)]
pub struct MemoryMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

impl MemoryMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

struct MemoryState {
    messages: Vec<MemoryMessage>,
    recent_usages: Vec<UsageRecord>,
}

/// Rolling conversation memory with turn-based trimming.
///
/// Holds the last few conversation turns and tool usages. Uses interior
/// mutability so a single instance can be shared between the front end
/// and the orchestrator behind an `Arc`.
pub struct ConversationMemory {
    max_messages: usize,
    state: RwLock<MemoryState>,
}

impl ConversationMemory {
    /// Create a memory with the default message cap.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_MESSAGES)
    }

    /// Create a memory keeping at most `max_messages` messages.
    pub fn with_capacity(max_messages: usize) -> Self {
        Self {
            max_messages,
            state: RwLock::new(MemoryState {
                messages: Vec::new(),
                recent_usages: Vec::new(),
            }),
        }
    }

    /// Append a message, trimming the oldest if over capacity.
    pub async fn add_message(&self, message: MemoryMessage) {
        let mut state = self.state.write().await;
        state.messages.push(message);
        while state.messages.len() > self.max_messages {
            state.messages.remove(0);
        }
    }

    /// Get a snapshot of the conversation history.
    pub async fn messages(&self) -> Vec<MemoryMessage> {
        self.state.read().await.messages.clone()
    }

    /// Get a snapshot of the recent tool usages, oldest first.
    pub async fn recent_usages(&self) -> Vec<UsageRecord> {
        self.state.read().await.recent_usages.clone()
    }

    /// Format the relevant context (recent tool usages) for prompt injection.
    ///
    /// Returns an empty string when there is nothing worth injecting.
    pub async fn relevant_context(&self) -> String {
        let state = self.state.read().await;
        if state.recent_usages.is_empty() {
            return String::new();
        }

        let mut lines = vec!["Recent tool usages:".to_string()];
        for usage in state.recent_usages.iter().rev().take(3).rev() {
            lines.push(format!(
                "- Used {}.{} with args: {}",
                usage.tool, usage.function, usage.arguments
            ));
        }
        lines.join("\n")
    }

    /// Detect the language of the latest user message by script ranges.
    ///
    /// Returns an ISO 639-1 code, or `None` when the history is empty.
    pub async fn detect_language(&self) -> Option<&'static str> {
        let state = self.state.read().await;
        let last_user = state.messages.iter().rev().find(|m| m.role == "user")?;

        Some(detect_script(&last_user.content))
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageSink for ConversationMemory {
    async fn record_usage(&self, record: UsageRecord) {
        let mut state = self.state.write().await;
        state.recent_usages.push(record);
        while state.recent_usages.len() > MAX_RECENT_USAGES {
            state.recent_usages.remove(0);
        }
    }
}

/// Map a text sample to a language code by its dominant script.
fn detect_script(text: &str) -> &'static str {
    for c in text.chars() {
        match c {
            'а'..='я' | 'А'..='Я' => return "ru",
            // Hiragana and katakana come before the CJK check because kanji
            // overlap with the Chinese range.
            '\u{3040}'..='\u{30ff}' => return "ja",
            '\u{4e00}'..='\u{9fff}' => return "zh",
            '\u{ac00}'..='\u{d7a3}' => return "ko",
            '\u{0600}'..='\u{06ff}' => return "ar",
            _ => {}
        }
    }
    "en"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_history_trimming() {
        let memory = ConversationMemory::with_capacity(3);
        for i in 0..5 {
            memory.add_message(MemoryMessage::user(format!("msg {}", i))).await;
        }

        let messages = memory.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "msg 2");
        assert_eq!(messages[2].content, "msg 4");
    }

    #[tokio::test]
    async fn test_usage_ring() {
        let memory = ConversationMemory::new();
        for i in 0..7 {
            memory
                .record_usage(UsageRecord::now(
                    "weather",
                    "get_weather",
                    json!({ "location": format!("city {}", i) }),
                    json!("sunny"),
                ))
                .await;
        }

        let usages = memory.recent_usages().await;
        assert_eq!(usages.len(), 5);
        assert_eq!(usages[0].arguments["location"], "city 2");
    }

    #[tokio::test]
    async fn test_relevant_context_empty() {
        let memory = ConversationMemory::new();
        assert!(memory.relevant_context().await.is_empty());
    }

    #[tokio::test]
    async fn test_relevant_context_lists_recent_usages() {
        let memory = ConversationMemory::new();
        memory
            .record_usage(UsageRecord::now(
                "news",
                "search_news",
                json!({ "query": "rust" }),
                json!([]),
            ))
            .await;

        let context = memory.relevant_context().await;
        assert!(context.contains("news.search_news"));
    }

    #[tokio::test]
    async fn test_language_detection() {
        let memory = ConversationMemory::new();
        assert_eq!(memory.detect_language().await, None);

        memory.add_message(MemoryMessage::user("Привет")).await;
        assert_eq!(memory.detect_language().await, Some("ru"));

        memory.add_message(MemoryMessage::user("こんにちは")).await;
        assert_eq!(memory.detect_language().await, Some("ja"));

        memory.add_message(MemoryMessage::user("hello")).await;
        assert_eq!(memory.detect_language().await, Some("en"));
    }
}
