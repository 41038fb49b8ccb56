//! Plan generation: ask the oracle to synthesize a chain for a request.

use std::sync::Arc;

use agent_tools::ToolRegistry;
use oracle_core::Oracle;
use tracing::{debug, trace, warn};

use crate::chain::{Chain, ChainStep};
use crate::error::ChainError;

/// Generates chains from free-form requests via the oracle.
///
/// The oracle's reply is unconstrained text that may wrap the intended
/// plan in prose or markdown, so the planner pattern-searches for the
/// first bracket-delimited array block instead of parsing the whole
/// reply. Whatever it extracts still goes through [`Chain::define`]:
/// the catalog in the prompt constrains tool names, but the planner never
/// bypasses validation.
pub struct ChainPlanner {
    oracle: Arc<dyn Oracle>,
}

impl ChainPlanner {
    /// Create a planner backed by the given oracle.
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Generate and validate a chain answering `query`.
    ///
    /// Fails with [`ChainError::Planning`] when the reply contains no
    /// parseable array, or [`ChainError::Validation`] when the extracted
    /// plan names unknown tools.
    pub async fn generate(
        &self,
        query: &str,
        registry: &ToolRegistry,
    ) -> Result<Chain, ChainError> {
        let prompt = self.build_prompt(query, registry)?;

        trace!(query = %query, "PLANNER_PROMPT");

        let reply = self.oracle.complete(&prompt).await?;

        trace!(raw_reply = %reply, reply_len = reply.len(), "PLANNER_RAW_REPLY");

        let steps = parse_plan(&reply).map_err(|e| {
            warn!(error = %e, raw_reply = %reply, "PLANNER_PARSE_FAILED");
            e
        })?;

        debug!("Planned chain with {} steps", steps.len());

        Chain::define(steps, registry)
    }

    fn build_prompt(&self, query: &str, registry: &ToolRegistry) -> Result<String, ChainError> {
        let catalog = serde_json::to_string_pretty(&registry.catalog())
            .map_err(|e| ChainError::Planning(format!("catalog serialization failed: {}", e)))?;

        Ok(format!(
            r#"Given the query: "{query}"
Available tools: {catalog}

Generate a chain of tool calls to answer the query. Each step is an object with:
- tool_name
- function_name
- input_params (use placeholders like {{{{previous_output.field}}}} for values produced by earlier steps)
- output_key
- condition (optional, for conditional execution)

IMPORTANT: Respond with ONLY a valid JSON array. Example:
[
    {{"tool_name": "weather", "function_name": "get_weather", "input_params": {{"location": "Tokyo"}}, "output_key": "weather_data"}},
    {{"tool_name": "news", "function_name": "search_news", "input_params": {{"query": "{{{{weather_data.location.city}}}} events", "max_results": 3}}, "output_key": "news_data", "condition": "weather_data.precipitation_mm > 0"}}
]

Use only tool and function names from the available tools list."#
        ))
    }
}

/// Extract and parse the plan array from a free-form oracle reply.
fn parse_plan(reply: &str) -> Result<Vec<ChainStep>, ChainError> {
    let block = extract_array_block(reply)
        .ok_or_else(|| ChainError::Planning("reply contains no array block".to_string()))?;

    serde_json::from_str(block)
        .map_err(|e| ChainError::Planning(format!("array block does not parse as a plan: {}", e)))
}

/// Find the first balanced `[...]` block in `text`.
///
/// Tracks string literals and escapes so brackets inside quoted values do
/// not unbalance the scan.
fn extract_array_block(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'[' if !in_string => depth += 1,
            b']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::stub_registry;
    use mock_oracle::{FailingOracle, StaticOracle};
    use serde_json::json;

    const PLAN_JSON: &str = r#"[
        {"tool_name": "stub", "function_name": "lookup",
         "input_params": {"key": "value [not a block]"}, "output_key": "data"}
    ]"#;

    #[test]
    fn test_extract_array_block_plain() {
        let block = extract_array_block("[1, 2, [3]] trailing").unwrap();
        assert_eq!(block, "[1, 2, [3]]");
    }

    #[test]
    fn test_extract_array_block_in_prose() {
        let reply = format!("Sure! Here is the plan:\n```json\n{}\n```\nHope it helps.", PLAN_JSON);
        let block = extract_array_block(&reply).unwrap();
        let steps: Vec<ChainStep> = serde_json::from_str(block).unwrap();
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_extract_array_ignores_brackets_in_strings() {
        let reply = r#"[{"a": "tricky ] bracket"}]"#;
        assert_eq!(extract_array_block(reply).unwrap(), reply);
    }

    #[test]
    fn test_extract_array_block_missing() {
        assert!(extract_array_block("no brackets here").is_none());
        assert!(extract_array_block("unterminated [1, 2").is_none());
    }

    #[test]
    fn test_parse_plan_rejects_non_array_shapes() {
        assert!(matches!(
            parse_plan("I could not decide on a plan."),
            Err(ChainError::Planning(_))
        ));
        assert!(matches!(
            parse_plan(r#"[1, 2, 3]"#),
            Err(ChainError::Planning(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_validates_plan() {
        let planner = ChainPlanner::new(Arc::new(StaticOracle::new(PLAN_JSON)));
        let registry = stub_registry();

        let chain = planner.generate("look something up", &registry).await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.steps()[0].output_key, "data");
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_tools() {
        let plan = json!([{
            "tool_name": "nonexistent_tool",
            "function_name": "lookup",
            "input_params": {},
            "output_key": "data"
        }])
        .to_string();

        let planner = ChainPlanner::new(Arc::new(StaticOracle::new(plan)));
        let registry = stub_registry();

        assert!(matches!(
            planner.generate("anything", &registry).await,
            Err(ChainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_planning_error_on_prose_reply() {
        let planner = ChainPlanner::new(Arc::new(StaticOracle::new(
            "I'm sorry, I cannot help with that.",
        )));
        let registry = stub_registry();

        assert!(matches!(
            planner.generate("anything", &registry).await,
            Err(ChainError::Planning(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_oracle_failure() {
        let planner = ChainPlanner::new(Arc::new(FailingOracle::default()));
        let registry = stub_registry();

        assert!(matches!(
            planner.generate("anything", &registry).await,
            Err(ChainError::Oracle(_))
        ));
    }
}
