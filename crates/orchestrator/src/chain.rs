//! Chain definition and validation.

use agent_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ChainError;

/// A single step in a tool execution chain.
///
/// This is the wire format for chains: an ordered array of these objects,
/// whether handed over as in-memory configuration or synthesized by the
/// planner. `input_params` values may embed `{{output_key.path.to.field}}`
/// placeholders; `condition` optionally guards execution of the step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    /// Tool to invoke.
    pub tool_name: String,
    /// Function within the tool.
    pub function_name: String,
    /// Ordered parameters, possibly containing placeholders.
    #[serde(default)]
    pub input_params: Map<String, Value>,
    /// Context key the result is bound under. Reuse is last-write-wins.
    pub output_key: String,
    /// Optional guard expression evaluated before the step runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A validated, immutable sequence of chain steps.
///
/// A `Chain` can only be obtained through [`Chain::define`] or
/// [`Chain::parse`], both of which registry-check every step; no partially
/// validated chain ever escapes. An empty chain is valid and runs as a
/// no-op.
#[derive(Debug, Clone)]
pub struct Chain {
    steps: Vec<ChainStep>,
}

impl Chain {
    /// Validate an in-memory step sequence against the registry.
    ///
    /// Fails with [`ChainError::Validation`] naming the first offending
    /// (tool, function) pair.
    pub fn define(steps: Vec<ChainStep>, registry: &ToolRegistry) -> Result<Self, ChainError> {
        for step in &steps {
            if !registry.has_function(&step.tool_name, &step.function_name) {
                return Err(ChainError::Validation(format!(
                    "unknown tool or function: {}.{}",
                    step.tool_name, step.function_name
                )));
            }
        }

        debug!("Validated chain with {} steps", steps.len());

        Ok(Self { steps })
    }

    /// Parse a serialized chain (JSON array of steps) and validate it.
    pub fn parse(config: &str, registry: &ToolRegistry) -> Result<Self, ChainError> {
        let steps: Vec<ChainStep> = serde_json::from_str(config)
            .map_err(|e| ChainError::Validation(format!("malformed chain config: {}", e)))?;
        Self::define(steps, registry)
    }

    /// Create an empty no-op chain.
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// The validated steps, in execution order.
    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
