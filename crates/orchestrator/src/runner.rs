//! Chain runner: drives validated steps in order, tolerating failures.

use std::sync::Arc;

use agent_tools::ToolRegistry;
use oracle_core::{Oracle, UsageRecord, UsageSink};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::chain::{Chain, ChainStep};
use crate::context::ExecutionContext;
use crate::error::ChainError;
use crate::executor::StepExecutor;
use crate::gate::ConditionGate;
use crate::resolver::resolve_params;

/// Drives a validated chain from first step to last.
///
/// Execution is strictly sequential: step N+1 never starts before step
/// N's gate/resolve/execute/bind cycle completes, and data-independent
/// steps are not reordered or parallelized. Per-step failures never abort
/// the chain; they are converted into inline `{error, alternative}`
/// bindings and the run continues to completion.
pub struct ChainRunner {
    executor: StepExecutor,
    gate: ConditionGate,
    oracle: Arc<dyn Oracle>,
    registry: Arc<ToolRegistry>,
    sink: Option<Arc<dyn UsageSink>>,
}

impl ChainRunner {
    /// Create a runner wiring gate, executor and fallback oracle.
    pub fn new(
        executor: StepExecutor,
        gate: ConditionGate,
        oracle: Arc<dyn Oracle>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            executor,
            gate,
            oracle,
            registry,
            sink: None,
        }
    }

    /// Attach a sink that receives one usage record per executed step.
    pub fn with_usage_sink(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run the chain to completion and return the final context.
    ///
    /// An empty chain returns the initial empty context. There is no
    /// abort transition: once a chain is validated it always runs every
    /// step (modulo gate skips).
    pub async fn run(&self, chain: &Chain) -> ExecutionContext {
        let mut context = ExecutionContext::new();

        for (index, step) in chain.steps().iter().enumerate() {
            debug!(
                "Step {}/{}: {}.{} -> {}",
                index + 1,
                chain.len(),
                step.tool_name,
                step.function_name,
                step.output_key
            );

            // Gate first: a false condition skips the step entirely, with
            // no resolution, no cache interaction and no usage record.
            if let Some(condition) = &step.condition {
                match self.gate.should_execute(condition, &context).await {
                    Ok(true) => {}
                    Ok(false) => {
                        info!(
                            "Skipping {}.{}: condition '{}' is false",
                            step.tool_name, step.function_name, condition
                        );
                        continue;
                    }
                    Err(e) => {
                        // Unevaluable gate: fail closed. The step body does
                        // not run, and the failure is surfaced inline like
                        // any other per-step error.
                        warn!("Gate failed for {}.{}: {}", step.tool_name, step.function_name, e);
                        self.bind_fallback(&mut context, step, e).await;
                        continue;
                    }
                }
            }

            match self.execute_step(step, &context).await {
                Ok(result) => {
                    context.bind(&step.output_key, result);
                }
                Err(e) => {
                    warn!(
                        "Step {}.{} failed: {}",
                        step.tool_name, step.function_name, e
                    );
                    self.bind_fallback(&mut context, step, e).await;
                }
            }
        }

        context
    }

    /// Resolve, execute and record one step.
    async fn execute_step(
        &self,
        step: &ChainStep,
        context: &ExecutionContext,
    ) -> Result<Value, ChainError> {
        let resolved = resolve_params(&step.input_params, context)?;

        let result = self
            .executor
            .execute(&step.tool_name, &step.function_name, &resolved)
            .await?;

        if let Some(sink) = &self.sink {
            sink.record_usage(UsageRecord::now(
                &step.tool_name,
                &step.function_name,
                Value::Object(resolved),
                result.clone(),
            ))
            .await;
        }

        Ok(result)
    }

    /// Ask the oracle for an alternative and bind the inline failure value.
    async fn bind_fallback(&self, context: &mut ExecutionContext, step: &ChainStep, error: ChainError) {
        let alternative = self.fallback_suggestion(step, &error).await;
        context.bind(
            &step.output_key,
            json!({
                "error": error.to_string(),
                "alternative": alternative,
            }),
        );
    }

    async fn fallback_suggestion(&self, step: &ChainStep, error: &ChainError) -> Value {
        let catalog = serde_json::to_string(&self.registry.catalog()).unwrap_or_default();
        let prompt = format!(
            "Tool {}.{} failed with error: {}\n\
             Available tools: {}\n\
             Suggest an alternative approach or response in one or two sentences.",
            step.tool_name, step.function_name, error, catalog
        );

        match self.oracle.complete(&prompt).await {
            Ok(suggestion) => Value::String(suggestion.trim().to_string()),
            Err(e) => {
                warn!("Fallback suggestion failed: {}", e);
                Value::Null
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ResultCache, RetryPolicy};
    use crate::testutil::{scenario_registry, stub_registry};
    use mock_oracle::StaticOracle;
    use oracle_core::ConversationMemory;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn runner_for(registry: Arc<ToolRegistry>, oracle: Arc<dyn Oracle>) -> ChainRunner {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(60)));
        let executor = StepExecutor::new(registry.clone(), cache, RetryPolicy::immediate(3));
        let gate = ConditionGate::new(oracle.clone());
        ChainRunner::new(executor, gate, oracle, registry)
    }

    fn step(tool: &str, function: &str, params: &[(&str, Value)], output_key: &str) -> ChainStep {
        ChainStep {
            tool_name: tool.to_string(),
            function_name: function.to_string(),
            input_params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            output_key: output_key.to_string(),
            condition: None,
        }
    }

    #[tokio::test]
    async fn test_steps_run_in_order_and_bind() {
        let registry = Arc::new(stub_registry());
        let runner = runner_for(registry.clone(), Arc::new(StaticOracle::new("unused")));

        let chain = Chain::define(
            vec![
                step("stub", "lookup", &[("key", json!("first"))], "a"),
                step("stub", "lookup", &[("key", json!("{{a.echo.key}}-again"))], "b"),
            ],
            &registry,
        )
        .unwrap();

        let context = runner.run(&chain).await;
        assert_eq!(context.len(), 2);
        assert_eq!(context.get_path("a.echo.key"), Some(&json!("first")));
        // The second step saw the first step's output through the resolver.
        assert_eq!(context.get_path("b.echo.key"), Some(&json!("first-again")));
    }

    #[tokio::test]
    async fn test_empty_chain_yields_empty_context() {
        let registry = Arc::new(stub_registry());
        let runner = runner_for(registry.clone(), Arc::new(StaticOracle::new("unused")));

        let context = runner.run(&Chain::empty()).await;
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_resolution_failure_binds_fallback_and_continues() {
        let registry = Arc::new(stub_registry());
        let runner = runner_for(
            registry.clone(),
            Arc::new(StaticOracle::new("Try the search tool instead.")),
        );

        let chain = Chain::define(
            vec![
                step("stub", "lookup", &[("key", json!("{{never_bound.field}}"))], "broken"),
                step("stub", "lookup", &[("key", json!("still runs"))], "after"),
            ],
            &registry,
        )
        .unwrap();

        let context = runner.run(&chain).await;
        assert_eq!(context.len(), 2);

        let broken = context.get("broken").unwrap();
        assert!(broken["error"]
            .as_str()
            .unwrap()
            .contains("{{never_bound.field}}"));
        assert_eq!(broken["alternative"], json!("Try the search tool instead."));
        // The failure did not abort the chain.
        assert_eq!(context.get_path("after.echo.key"), Some(&json!("still runs")));
    }

    #[tokio::test]
    async fn test_usage_records_per_executed_step() {
        let registry = Arc::new(stub_registry());
        let memory = Arc::new(ConversationMemory::new());
        let cache = Arc::new(ResultCache::new(Duration::from_secs(60)));
        let executor = StepExecutor::new(registry.clone(), cache, RetryPolicy::immediate(3));
        let oracle: Arc<dyn Oracle> = Arc::new(StaticOracle::new("unused"));
        let runner = ChainRunner::new(
            executor,
            ConditionGate::new(oracle.clone()),
            oracle,
            registry.clone(),
        )
        .with_usage_sink(memory.clone());

        let chain = Chain::define(
            vec![
                step("stub", "lookup", &[("key", json!("one"))], "a"),
                step("stub", "lookup", &[("key", json!("{{missing.path}}"))], "b"),
            ],
            &registry,
        )
        .unwrap();

        runner.run(&chain).await;

        // Only the successful step produced a record.
        let usages = memory.recent_usages().await;
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].tool, "stub");
        assert_eq!(usages[0].arguments["key"], json!("one"));
    }

    #[tokio::test]
    async fn test_skipped_step_leaves_no_trace() {
        // Scenario A: rain == 0, so the conditional news step is skipped.
        let (registry, news_calls) = scenario_registry(0.0);
        let runner = runner_for(registry.clone(), Arc::new(StaticOracle::new("unused")));

        let mut news_step = step(
            "news",
            "search_news",
            &[("query", json!("{{weather_data.location.city}} events"))],
            "news_data",
        );
        news_step.condition = Some("weather_data.precipitation.rain > 0".to_string());

        let chain = Chain::define(
            vec![
                step("weather", "get_weather", &[("location", json!("Tokyo"))], "weather_data"),
                news_step,
            ],
            &registry,
        )
        .unwrap();

        let context = runner.run(&chain).await;

        assert_eq!(context.len(), 1);
        assert!(context.contains_key("weather_data"));
        assert!(!context.contains_key("news_data"));
        assert_eq!(news_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_condition_true_executes_step() {
        let (registry, news_calls) = scenario_registry(4.2);
        let runner = runner_for(registry.clone(), Arc::new(StaticOracle::new("unused")));

        let mut news_step = step(
            "news",
            "search_news",
            &[("query", json!("{{weather_data.location.city}} events"))],
            "news_data",
        );
        news_step.condition = Some("weather_data.precipitation.rain > 0".to_string());

        let chain = Chain::define(
            vec![
                step("weather", "get_weather", &[("location", json!("Tokyo"))], "weather_data"),
                news_step,
            ],
            &registry,
        )
        .unwrap();

        let context = runner.run(&chain).await;

        assert_eq!(context.len(), 2);
        assert_eq!(context.get_path("news_data.query"), Some(&json!("Tokyo events")));
        assert_eq!(news_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reference_to_skipped_output_is_resolution_failure() {
        // A later placeholder naming a skipped step's output_key resolves
        // to nothing and takes the inline-fallback path.
        let (registry, _) = scenario_registry(0.0);
        let runner = runner_for(registry.clone(), Arc::new(StaticOracle::new("no data")));

        let mut news_step = step(
            "news",
            "search_news",
            &[("query", json!("anything"))],
            "news_data",
        );
        news_step.condition = Some("weather_data.precipitation.rain > 0".to_string());

        let chain = Chain::define(
            vec![
                step("weather", "get_weather", &[("location", json!("Oslo"))], "weather_data"),
                news_step,
                step("news", "search_news", &[("query", json!("{{news_data.query}}"))], "followup"),
            ],
            &registry,
        )
        .unwrap();

        let context = runner.run(&chain).await;

        let followup = context.get("followup").unwrap();
        assert!(followup["error"].as_str().unwrap().contains("{{news_data.query}}"));
    }
}
