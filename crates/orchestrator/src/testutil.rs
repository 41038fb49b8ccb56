//! Shared tool fixtures for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use agent_tools::{FunctionSpec, Tool, ToolArgs, ToolError, ToolRegistry};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Echoes its parameters back under an `echo` key.
struct StubTool;

const STUB_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "lookup",
    description: "Echoes the given parameters back",
    params: "key (string)",
}];

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        "stub"
    }

    fn description(&self) -> &str {
        "Deterministic echo tool"
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        STUB_FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "lookup" => Ok(json!({ "echo": Value::Object(args.params) })),
            other => Err(ToolError::FunctionNotFound {
                tool: self.name().to_string(),
                function: other.to_string(),
            }),
        }
    }
}

/// A registry with the single `stub.lookup` echo function.
pub fn stub_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(StubTool);
    registry
}

/// Fails the first `fail_count` calls, then returns `{"ok": true}`.
struct FlakyTool {
    fail_count: u32,
    calls: Arc<AtomicU32>,
}

const FLAKY_FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "fetch",
        description: "Fails a configured number of times, then succeeds",
        params: "key (string)",
    },
    // Declared so registry dispatch reaches the tool, which then reports
    // FunctionNotFound itself; lets the counter observe the attempt.
    FunctionSpec {
        name: "no_such_fn",
        description: "Always unimplemented; exercises tool-level FunctionNotFound",
        params: "",
    },
];

#[async_trait]
impl Tool for FlakyTool {
    fn name(&self) -> &str {
        "flaky"
    }

    fn description(&self) -> &str {
        "Deterministic flaky tool"
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FLAKY_FUNCTIONS
    }

    async fn call(&self, function: &str, _args: ToolArgs) -> Result<Value, ToolError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        match function {
            "fetch" => {
                if attempt < self.fail_count {
                    Err(ToolError::ExecutionFailed(format!(
                        "transient failure {}",
                        attempt + 1
                    )))
                } else {
                    Ok(json!({ "ok": true }))
                }
            }
            other => Err(ToolError::FunctionNotFound {
                tool: self.name().to_string(),
                function: other.to_string(),
            }),
        }
    }
}

/// A registry whose `flaky.fetch` fails `fail_count` times before succeeding,
/// plus the counter recording total call attempts (any function name).
pub fn flaky_registry(fail_count: u32) -> (Arc<ToolRegistry>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let mut registry = ToolRegistry::new();
    registry.register(FlakyTool {
        fail_count,
        calls: calls.clone(),
    });
    (Arc::new(registry), calls)
}

/// Returns a fixed weather report with the configured rain amount.
struct FixedWeatherTool {
    rain: f64,
}

const WEATHER_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "get_weather",
    description: "Returns a canned weather report",
    params: "location (string)",
}];

#[async_trait]
impl Tool for FixedWeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Canned weather data"
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        WEATHER_FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "get_weather" => Ok(json!({
                "location": { "city": args.get_string("location")? },
                "precipitation": { "rain": self.rain },
            })),
            other => Err(ToolError::FunctionNotFound {
                tool: self.name().to_string(),
                function: other.to_string(),
            }),
        }
    }
}

/// Echoes the query and counts invocations.
struct CountingNewsTool {
    calls: Arc<AtomicU32>,
}

const NEWS_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "search_news",
    description: "Echoes the search query",
    params: "query (string)",
}];

#[async_trait]
impl Tool for CountingNewsTool {
    fn name(&self) -> &str {
        "news"
    }

    fn description(&self) -> &str {
        "Canned news search"
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        NEWS_FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "search_news" => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "query": args.get_string("query")? }))
            }
            other => Err(ToolError::FunctionNotFound {
                tool: self.name().to_string(),
                function: other.to_string(),
            }),
        }
    }
}

/// Weather + news registry for conditional-chain tests.
///
/// The weather report always carries `precipitation.rain == rain`; the
/// returned counter tracks how many times `news.search_news` actually ran.
pub fn scenario_registry(rain: f64) -> (Arc<ToolRegistry>, Arc<AtomicU32>) {
    let news_calls = Arc::new(AtomicU32::new(0));
    let mut registry = ToolRegistry::new();
    registry.register(FixedWeatherTool { rain });
    registry.register(CountingNewsTool {
        calls: news_calls.clone(),
    });
    (Arc::new(registry), news_calls)
}
