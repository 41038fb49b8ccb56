//! Tool trait definition and types.

use serde::Serialize;
use serde_json::{Map, Value};

use async_trait::async_trait;

use crate::error::ToolError;

/// Description of one function a tool exposes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FunctionSpec {
    /// Function name (used for dispatch).
    pub name: &'static str,
    /// Human-readable description of what the function does.
    pub description: &'static str,
    /// Short description of the expected parameters.
    pub params: &'static str,
}

/// Arguments passed to a tool function for execution.
///
/// Parameters keep their declared order (`serde_json` is built with
/// `preserve_order`), which matters for canonical serialization upstream.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as ordered key-value pairs.
    pub params: Map<String, Value>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: Map<String, Value>) -> Self {
        Self { params }
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an optional string parameter.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params.get(key)?.as_str().map(|s| s.to_string())
    }

    /// Get an f64 parameter, returning an error if missing or not a number.
    pub fn get_f64(&self, key: &str) -> Result<f64, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_f64()
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected number".to_string(),
            })
    }

    /// Get an optional positive integer parameter with a default value.
    pub fn get_usize_or(&self, key: &str, default: usize) -> usize {
        self.params
            .get(key)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(default)
    }
}

/// Trait for tools that can be executed by the orchestrator.
///
/// A tool groups one or more named functions over a single external data
/// source (weather, news, currency, etc.). Dispatch is late-bound by
/// (tool name, function name) through the registry; results are returned
/// as opaque JSON values the orchestrator stores without inspecting.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Functions this tool exposes.
    fn functions(&self) -> &'static [FunctionSpec];

    /// Execute one of the tool's functions with the given arguments.
    ///
    /// Implementations must return [`ToolError::FunctionNotFound`] for
    /// function names outside [`Tool::functions`].
    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError>;
}

/// Helper for building the standard unknown-function error inside tools.
pub(crate) fn unknown_function(tool: &str, function: &str) -> ToolError {
    ToolError::FunctionNotFound {
        tool: tool.to_string(),
        function: function.to_string(),
    }
}
