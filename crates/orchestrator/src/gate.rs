//! Conditional gate: decides whether a guarded step runs at all.
//!
//! Conditions come in two shapes. Comparisons over context fields
//! (`weather_data.precipitation.rain > 0`) and bare-path truthiness checks
//! are evaluated mechanically. Anything else is delegated to the oracle
//! with a strict yes/no prompt whose reply is parsed defensively.

use std::sync::Arc;

use oracle_core::Oracle;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::context::ExecutionContext;
use crate::error::ChainError;

/// Comparison operators recognized by the mechanical evaluator, longest
/// first so `>=` is not misread as `>`.
const OPERATORS: &[&str] = &["==", "!=", ">=", "<=", ">", "<"];

/// Gate that evaluates step conditions against the current context.
pub struct ConditionGate {
    oracle: Arc<dyn Oracle>,
}

impl ConditionGate {
    /// Create a gate backed by the given oracle for non-mechanical
    /// conditions.
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Decide whether a step guarded by `condition` should execute.
    ///
    /// Fails with [`ChainError::Gate`] when the condition is neither
    /// mechanically evaluable nor answered intelligibly by the oracle.
    pub async fn should_execute(
        &self,
        condition: &str,
        context: &ExecutionContext,
    ) -> Result<bool, ChainError> {
        if let Some(verdict) = eval_mechanical(condition, context) {
            debug!("Condition '{}' evaluated mechanically: {}", condition, verdict);
            return Ok(verdict);
        }

        self.ask_oracle(condition, context).await
    }

    async fn ask_oracle(
        &self,
        condition: &str,
        context: &ExecutionContext,
    ) -> Result<bool, ChainError> {
        let prompt = format!(
            "Given the context: {}\n\
             Evaluate the condition: {}\n\
             Answer with exactly \"yes\" or \"no\".",
            context.to_value(),
            condition
        );

        trace!(condition = %condition, "GATE_ORACLE_PROMPT");

        let reply = self
            .oracle
            .complete(&prompt)
            .await
            .map_err(|e| ChainError::Gate(format!("oracle failed for '{}': {}", condition, e)))?;

        match parse_verdict(&reply) {
            Some(verdict) => {
                debug!("Condition '{}' judged by oracle: {}", condition, verdict);
                Ok(verdict)
            }
            None => {
                warn!(
                    condition = %condition,
                    raw_reply = %reply,
                    "GATE_VERDICT_UNPARSEABLE"
                );
                Err(ChainError::Gate(format!(
                    "unparseable verdict for '{}': {}",
                    condition,
                    reply.trim()
                )))
            }
        }
    }
}

/// Try to evaluate a condition without the oracle.
///
/// Returns `None` when the expression shape is not recognized, a referenced
/// path is absent, or the operand types cannot be compared; the caller then
/// falls back to the oracle.
fn eval_mechanical(condition: &str, context: &ExecutionContext) -> Option<bool> {
    let condition = condition.trim();

    for op in OPERATORS {
        if let Some(pos) = condition.find(op) {
            let lhs = condition[..pos].trim();
            let rhs = condition[pos + op.len()..].trim();
            if lhs.is_empty() || rhs.is_empty() {
                return None;
            }

            let left = context.get_path(lhs)?;
            let right = parse_literal(rhs);
            return compare(left, &right, op);
        }
    }

    // Bare dotted path: truthiness of the referenced value.
    if is_path(condition) {
        return Some(
            context
                .get_path(condition)
                .map(is_truthy)
                .unwrap_or(false),
        );
    }

    None
}

/// Parse a literal operand: JSON scalar if possible, bare word as string.
fn parse_literal(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.trim_matches('\'').to_string()))
}

fn compare(left: &Value, right: &Value, op: &str) -> Option<bool> {
    match op {
        "==" => Some(loose_eq(left, right)),
        "!=" => Some(!loose_eq(left, right)),
        _ => {
            let l = left.as_f64()?;
            let r = right.as_f64()?;
            match op {
                ">" => Some(l > r),
                ">=" => Some(l >= r),
                "<" => Some(l < r),
                "<=" => Some(l <= r),
                _ => None,
            }
        }
    }
}

/// Equality that tolerates 0 vs 0.0 style numeric mismatches.
fn loose_eq(left: &Value, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l == r;
    }
    left == right
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn is_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// Extract a yes/no verdict from free-form oracle text, case-insensitive.
fn parse_verdict(reply: &str) -> Option<bool> {
    for token in reply.split(|c: char| !c.is_alphanumeric()) {
        match token.to_lowercase().as_str() {
            "yes" | "true" => return Some(true),
            "no" | "false" => return Some(false),
            _ => {}
        }
    }
    None
}
