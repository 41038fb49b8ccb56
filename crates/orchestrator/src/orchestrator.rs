//! Top-level facade wiring planner, runner and synthesizer together.

use std::sync::Arc;
use std::time::Duration;

use agent_tools::ToolRegistry;
use oracle_core::{Oracle, UsageSink};
use tracing::info;

use crate::chain::Chain;
use crate::context::ExecutionContext;
use crate::error::ChainError;
use crate::executor::{ResultCache, RetryPolicy, StepExecutor, DEFAULT_CACHE_TTL};
use crate::gate::ConditionGate;
use crate::planner::ChainPlanner;
use crate::runner::ChainRunner;
use crate::synthesizer::ResponseSynthesizer;

/// End-to-end chain orchestrator.
///
/// Owns the step-result cache, so results are shared between every chain
/// processed through the same instance.
pub struct ChainOrchestrator {
    oracle: Arc<dyn Oracle>,
    registry: Arc<ToolRegistry>,
    cache: Arc<ResultCache>,
    retry: RetryPolicy,
    sink: Option<Arc<dyn UsageSink>>,
}

impl ChainOrchestrator {
    /// Create an orchestrator over the given oracle and tool registry.
    pub fn new(oracle: Arc<dyn Oracle>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            oracle,
            registry,
            cache: Arc::new(ResultCache::new(DEFAULT_CACHE_TTL)),
            retry: RetryPolicy::default(),
            sink: None,
        }
    }

    /// Record per-step tool usage into the given sink.
    pub fn with_usage_sink(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Override the default retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the result cache with one using the given TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(ResultCache::new(ttl));
        self
    }

    /// Answer a free-form query: plan a chain, run it, synthesize a reply.
    ///
    /// Planning and validation failures are fatal; step failures are not,
    /// so a reply is produced even when every step failed.
    pub async fn process(&self, query: &str) -> Result<String, ChainError> {
        let planner = ChainPlanner::new(self.oracle.clone());
        let chain = planner.generate(query, &self.registry).await?;

        info!("Planned {} steps for query", chain.len());

        let context = self.run_chain(&chain).await;

        let synthesizer = ResponseSynthesizer::new(self.oracle.clone());
        synthesizer.synthesize(query, &context).await
    }

    /// Validate and run a caller-supplied chain definition (JSON array).
    pub async fn run_defined(&self, config: &str) -> Result<ExecutionContext, ChainError> {
        let chain = Chain::parse(config, &self.registry)?;
        Ok(self.run_chain(&chain).await)
    }

    /// Run an already-validated chain to completion.
    pub async fn run_chain(&self, chain: &Chain) -> ExecutionContext {
        let executor = StepExecutor::new(
            self.registry.clone(),
            self.cache.clone(),
            self.retry.clone(),
        );
        let gate = ConditionGate::new(self.oracle.clone());

        let mut runner = ChainRunner::new(executor, gate, self.oracle.clone(), self.registry.clone());
        if let Some(sink) = &self.sink {
            runner = runner.with_usage_sink(sink.clone());
        }

        runner.run(chain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::stub_registry;
    use mock_oracle::ScriptedOracle;
    use serde_json::json;

    #[tokio::test]
    async fn test_process_plans_runs_and_synthesizes() {
        let plan = json!([{
            "tool_name": "stub",
            "function_name": "lookup",
            "input_params": {"key": "value"},
            "output_key": "data"
        }])
        .to_string();

        // First reply answers the planner, second the synthesizer.
        let oracle = Arc::new(ScriptedOracle::new(vec![
            plan,
            "Here is what I found.".to_string(),
        ]));
        let orchestrator = ChainOrchestrator::new(oracle, Arc::new(stub_registry()));

        let reply = orchestrator.process("look it up").await.unwrap();
        assert_eq!(reply, "Here is what I found.");
    }

    #[tokio::test]
    async fn test_run_defined_rejects_unknown_tool() {
        let oracle = Arc::new(ScriptedOracle::new(vec![]));
        let orchestrator = ChainOrchestrator::new(oracle, Arc::new(stub_registry()));

        let config = r#"[
            {"tool_name": "nonexistent_tool", "function_name": "lookup",
             "input_params": {}, "output_key": "data"}
        ]"#;

        assert!(matches!(
            orchestrator.run_defined(config).await,
            Err(ChainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cache_shared_across_runs() {
        let oracle = Arc::new(ScriptedOracle::new(vec![]));
        let orchestrator = ChainOrchestrator::new(oracle, Arc::new(stub_registry()));

        let config = r#"[
            {"tool_name": "stub", "function_name": "lookup",
             "input_params": {"key": "value"}, "output_key": "data"}
        ]"#;

        orchestrator.run_defined(config).await.unwrap();
        orchestrator.run_defined(config).await.unwrap();

        // Both runs hit the same invocation; one cache entry total.
        assert_eq!(orchestrator.cache.len().await, 1);
    }
}
