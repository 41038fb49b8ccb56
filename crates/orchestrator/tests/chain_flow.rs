//! End-to-end chain flows through the public orchestrator API.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use agent_tools::{FunctionSpec, Tool, ToolArgs, ToolError, ToolRegistry};
use async_trait::async_trait;
use mock_oracle::ScriptedOracle;
use orchestrator::{ChainError, ChainOrchestrator, RetryPolicy};
use oracle_core::ConversationMemory;
use serde_json::{json, Value};

/// Canned weather tool with a configurable rain amount and call counter.
struct WeatherStub {
    rain: f64,
    calls: Arc<AtomicU32>,
}

const WEATHER_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "get_weather",
    description: "Current weather for a location",
    params: "location (string)",
}];

#[async_trait]
impl Tool for WeatherStub {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Weather lookups"
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        WEATHER_FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_weather" => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({
                    "location": { "city": args.get_string("location")? },
                    "temperature_c": 18,
                    "precipitation": { "rain": self.rain },
                }))
            }
            other => Err(ToolError::FunctionNotFound {
                tool: "weather".to_string(),
                function: other.to_string(),
            }),
        }
    }
}

/// News search stub that counts invocations.
struct NewsStub {
    calls: Arc<AtomicU32>,
}

const NEWS_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "search_news",
    description: "Search news by keyword",
    params: "query (string)",
}];

#[async_trait]
impl Tool for NewsStub {
    fn name(&self) -> &str {
        "news"
    }

    fn description(&self) -> &str {
        "News search"
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        NEWS_FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "search_news" => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "headlines": [format!("story about {}", args.get_string("query")?)] }))
            }
            other => Err(ToolError::FunctionNotFound {
                tool: "news".to_string(),
                function: other.to_string(),
            }),
        }
    }
}

/// Fails a configured number of times before succeeding.
struct FlakyStub {
    fail_count: u32,
    calls: Arc<AtomicU32>,
}

const FLAKY_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "fetch",
    description: "Fetch a record",
    params: "key (string)",
}];

#[async_trait]
impl Tool for FlakyStub {
    fn name(&self) -> &str {
        "flaky"
    }

    fn description(&self) -> &str {
        "Unreliable fetcher"
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FLAKY_FUNCTIONS
    }

    async fn call(&self, function: &str, _args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "fetch" => {
                let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
                if attempt < self.fail_count {
                    Err(ToolError::ExecutionFailed("upstream timeout".to_string()))
                } else {
                    Ok(json!({ "ok": true }))
                }
            }
            other => Err(ToolError::FunctionNotFound {
                tool: "flaky".to_string(),
                function: other.to_string(),
            }),
        }
    }
}

struct Fixture {
    registry: Arc<ToolRegistry>,
    weather_calls: Arc<AtomicU32>,
    news_calls: Arc<AtomicU32>,
    flaky_calls: Arc<AtomicU32>,
}

fn fixture(rain: f64, flaky_failures: u32) -> Fixture {
    let weather_calls = Arc::new(AtomicU32::new(0));
    let news_calls = Arc::new(AtomicU32::new(0));
    let flaky_calls = Arc::new(AtomicU32::new(0));

    let mut registry = ToolRegistry::new();
    registry.register(WeatherStub {
        rain,
        calls: weather_calls.clone(),
    });
    registry.register(NewsStub {
        calls: news_calls.clone(),
    });
    registry.register(FlakyStub {
        fail_count: flaky_failures,
        calls: flaky_calls.clone(),
    });

    Fixture {
        registry: Arc::new(registry),
        weather_calls,
        news_calls,
        flaky_calls,
    }
}

fn conditional_plan() -> String {
    json!([
        {
            "tool_name": "weather",
            "function_name": "get_weather",
            "input_params": {"location": "Tokyo"},
            "output_key": "weather_data"
        },
        {
            "tool_name": "news",
            "function_name": "search_news",
            "input_params": {"query": "{{weather_data.location.city}} events"},
            "output_key": "news_data",
            "condition": "weather_data.precipitation.rain > 0"
        }
    ])
    .to_string()
}

#[tokio::test]
async fn process_skips_conditional_step_when_dry() {
    let fx = fixture(0.0, 0);

    // Planner reply, then synthesizer reply: the gate never consults the
    // oracle because the comparison is mechanical.
    let oracle = Arc::new(ScriptedOracle::new(vec![
        conditional_plan(),
        "Clear skies in Tokyo.".to_string(),
    ]));

    let orchestrator = ChainOrchestrator::new(oracle.clone(), fx.registry.clone());
    let reply = orchestrator.process("weather in tokyo?").await.unwrap();

    assert_eq!(reply, "Clear skies in Tokyo.");
    assert_eq!(fx.weather_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fx.news_calls.load(Ordering::SeqCst), 0);

    // The synthesizer saw weather data but no news binding.
    let prompts = oracle.prompts().await;
    let synthesis = prompts.last().unwrap();
    assert!(synthesis.contains("weather_data"));
    assert!(!synthesis.contains("news_data"));
}

#[tokio::test]
async fn process_runs_conditional_step_when_raining() {
    let fx = fixture(5.0, 0);

    let oracle = Arc::new(ScriptedOracle::new(vec![
        conditional_plan(),
        "Rainy, with local events listed.".to_string(),
    ]));

    let orchestrator = ChainOrchestrator::new(oracle, fx.registry.clone());
    orchestrator.process("weather in tokyo?").await.unwrap();

    assert_eq!(fx.news_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_plan_fails_before_any_execution() {
    let fx = fixture(0.0, 0);

    let plan = json!([{
        "tool_name": "nonexistent_tool",
        "function_name": "get_data",
        "input_params": {},
        "output_key": "data"
    }])
    .to_string();

    let oracle = Arc::new(ScriptedOracle::new(vec![plan]));
    let orchestrator = ChainOrchestrator::new(oracle, fx.registry.clone());

    let err = orchestrator.process("anything").await.unwrap_err();
    match err {
        ChainError::Validation(msg) => assert!(msg.contains("nonexistent_tool")),
        other => panic!("expected Validation, got {:?}", other),
    }

    // Nothing ran.
    assert_eq!(fx.weather_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fx.news_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transient_failures_are_retried_to_success() {
    // Fails twice, succeeds on the third attempt within one step.
    let fx = fixture(0.0, 2);

    let config = r#"[
        {"tool_name": "flaky", "function_name": "fetch",
         "input_params": {"key": "record-1"}, "output_key": "data"}
    ]"#;

    let oracle = Arc::new(ScriptedOracle::new(vec![]));
    let orchestrator = ChainOrchestrator::new(oracle, fx.registry.clone())
        .with_retry_policy(RetryPolicy::immediate(3));

    let context = orchestrator.run_defined(config).await.unwrap();

    assert_eq!(fx.flaky_calls.load(Ordering::SeqCst), 3);
    assert_eq!(context.get_path("data.ok"), Some(&json!(true)));

    // A repeat run is served from the cache: no fourth call.
    orchestrator.run_defined(config).await.unwrap();
    assert_eq!(fx.flaky_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_step_binds_error_and_chain_continues() {
    let fx = fixture(0.0, u32::MAX);

    let config = r#"[
        {"tool_name": "flaky", "function_name": "fetch",
         "input_params": {"key": "record-1"}, "output_key": "data"},
        {"tool_name": "weather", "function_name": "get_weather",
         "input_params": {"location": "Oslo"}, "output_key": "weather_data"}
    ]"#;

    // One oracle reply: the fallback suggestion for the failed step.
    let oracle = Arc::new(ScriptedOracle::new(vec![
        "Try again later or use the search tool.".to_string(),
    ]));
    let orchestrator = ChainOrchestrator::new(oracle, fx.registry.clone())
        .with_retry_policy(RetryPolicy::immediate(2));

    let context = orchestrator.run_defined(config).await.unwrap();

    assert_eq!(fx.flaky_calls.load(Ordering::SeqCst), 2);

    let failed = context.get("data").unwrap();
    assert!(failed["error"].as_str().unwrap().contains("flaky.fetch"));
    assert_eq!(
        failed["alternative"],
        json!("Try again later or use the search tool.")
    );

    // The second step still ran.
    assert_eq!(context.get_path("weather_data.location.city"), Some(&json!("Oslo")));
}

#[tokio::test]
async fn usage_records_flow_into_memory() {
    let fx = fixture(5.0, 0);
    let memory = Arc::new(ConversationMemory::new());

    let oracle = Arc::new(ScriptedOracle::new(vec![
        conditional_plan(),
        "Done.".to_string(),
    ]));
    let orchestrator = ChainOrchestrator::new(oracle, fx.registry.clone())
        .with_usage_sink(memory.clone());

    orchestrator.process("weather in tokyo?").await.unwrap();

    let usages = memory.recent_usages().await;
    assert_eq!(usages.len(), 2);
    assert_eq!(usages[0].tool, "weather");
    assert_eq!(usages[1].tool, "news");
    // Placeholders were resolved before recording.
    assert_eq!(usages[1].arguments["query"], json!("Tokyo events"));
}
