//! Execution context: the accumulating state of one chain run.

use serde_json::{Map, Value};
use tracing::debug;

/// Mutable key → value state produced by a chain run.
///
/// Created empty when a run starts, grown (or overwritten, last write
/// wins) as steps complete, and discarded when the run ends. A context is
/// owned exclusively by one runner invocation; nothing persists across
/// runs.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    values: Map<String, Value>,
}

impl ExecutionContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under `key`, replacing any earlier binding.
    pub fn bind(&mut self, key: &str, value: Value) {
        if self.values.contains_key(key) {
            debug!("Overwriting context binding '{}'", key);
        }
        self.values.insert(key.to_string(), value);
    }

    /// Get a top-level binding.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Walk a dotted path (`output_key.field.nested`) into the context.
    ///
    /// Path segments index objects by key and arrays by decimal position.
    /// Returns `None` on any missing key, missing field, bad index, or
    /// attempt to descend into a scalar.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Whether a top-level binding exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of top-level bindings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context has no bindings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// View the context as a JSON object for serialization into prompts.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Consume the context into its underlying JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}
