//! Tool registry for late-bound (tool, function) dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs};

/// Serializable catalog entry describing one registered tool.
///
/// The planner embeds the catalog into its prompt so the oracle knows
/// which (tool, function) pairs exist.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Functions the tool exposes, with parameter hints.
    pub functions: Vec<FunctionDescriptor>,
}

/// Serializable catalog entry describing one tool function.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDescriptor {
    /// Function name.
    pub name: String,
    /// Function description.
    pub description: String,
    /// Expected parameters, as a short human-readable hint.
    pub params: String,
}

/// Registry mapping (tool name, function name) to invocable tools.
///
/// Built once at startup and never mutated afterward; every dynamic
/// dispatch in the system goes through this single indirection rather
/// than ad hoc name matching.
pub struct ToolRegistry {
    /// Registered tools by name.
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, Arc::new(tool));
    }

    /// Register a shared tool.
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Get a list of registered tool names.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Check whether a (tool, function) pair is registered.
    pub fn has_function(&self, tool: &str, function: &str) -> bool {
        self.tools
            .get(tool)
            .map(|t| t.functions().iter().any(|f| f.name == function))
            .unwrap_or(false)
    }

    /// Look up the tool backing a (tool, function) pair.
    ///
    /// Fails with [`ToolError::ToolNotFound`] for an unknown tool and
    /// [`ToolError::FunctionNotFound`] for a known tool without the
    /// requested function.
    pub fn lookup(&self, tool: &str, function: &str) -> Result<Arc<dyn Tool>, ToolError> {
        let found = self
            .tools
            .get(tool)
            .ok_or_else(|| ToolError::ToolNotFound(tool.to_string()))?;

        if !found.functions().iter().any(|f| f.name == function) {
            return Err(ToolError::FunctionNotFound {
                tool: tool.to_string(),
                function: function.to_string(),
            });
        }

        Ok(Arc::clone(found))
    }

    /// Execute a function by (tool, function) name with the given parameters.
    pub async fn call(
        &self,
        tool: &str,
        function: &str,
        params: Map<String, Value>,
    ) -> Result<Value, ToolError> {
        let target = self.lookup(tool, function)?;

        debug!(
            "Calling {}.{} with {} params",
            tool,
            function,
            params.len()
        );

        let result = target.call(function, ToolArgs::new(params)).await?;

        debug!("{}.{} completed", tool, function);

        Ok(result)
    }

    /// Build the serializable tool catalog for prompt embedding.
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        let mut entries: Vec<ToolDescriptor> = self
            .tools
            .values()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                functions: t
                    .functions()
                    .iter()
                    .map(|f| FunctionDescriptor {
                        name: f.name.to_string(),
                        description: f.description.to_string(),
                        params: f.params.to_string(),
                    })
                    .collect(),
            })
            .collect();
        // HashMap iteration order is unstable; sort for a stable catalog.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
