//! Parameter placeholder resolution.
//!
//! Step parameters may reference earlier step outputs with double-brace
//! placeholders: a value that is exactly `"{{output_key.path.to.field}}"`
//! is replaced by the referenced value with its type intact, while a
//! string embedding one or more placeholders among other text gets them
//! interpolated as strings. Everything else passes through unchanged.
//!
//! Resolution is pure: it reads the context and never mutates it, so
//! resolving the same parameters twice against an unchanged context
//! yields identical output.

use serde_json::{Map, Value};

use crate::context::ExecutionContext;
use crate::error::ChainError;

/// Resolve all placeholders in a step's parameters against the context.
///
/// Any missing key, missing nested field, or type mismatch while walking
/// a path fails with [`ChainError::Resolution`] naming the exact
/// unresolved placeholder.
pub fn resolve_params(
    params: &Map<String, Value>,
    context: &ExecutionContext,
) -> Result<Map<String, Value>, ChainError> {
    let mut resolved = Map::new();
    for (key, value) in params {
        resolved.insert(key.clone(), resolve_value(value, context)?);
    }
    Ok(resolved)
}

fn resolve_value(value: &Value, context: &ExecutionContext) -> Result<Value, ChainError> {
    let Some(text) = value.as_str() else {
        return Ok(value.clone());
    };

    // Whole-string placeholder: substitute the referenced value, type intact.
    if let Some(path) = whole_placeholder(text) {
        return context
            .get_path(path)
            .cloned()
            .ok_or_else(|| ChainError::Resolution(text.to_string()));
    }

    // Embedded placeholders: interpolate each as a string.
    if text.contains("{{") {
        return interpolate(text, context).map(Value::String);
    }

    Ok(value.clone())
}

/// If `text` is exactly one `{{path}}` placeholder, return the path.
fn whole_placeholder(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("{{")?.strip_suffix("}}")?;
    let inner = inner.trim();
    if inner.is_empty() || inner.contains("{{") || inner.contains("}}") {
        None
    } else {
        Some(inner)
    }
}

/// Replace every `{{path}}` occurrence in `text` with the referenced
/// value rendered as a string.
fn interpolate(text: &str, context: &ExecutionContext) -> Result<String, ChainError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            // Unterminated braces are treated as literal text.
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let placeholder = &rest[start..start + 2 + end + 2];
        let path = after[..end].trim();
        let value = context
            .get_path(path)
            .ok_or_else(|| ChainError::Resolution(placeholder.to_string()))?;

        match value {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> ExecutionContext {
        let mut context = ExecutionContext::new();
        context.bind(
            "weather_data",
            json!({
                "location": { "city": "Tokyo" },
                "temperature_c": 21.5,
            }),
        );
        context
    }

    fn params(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_whole_placeholder_keeps_type() {
        let resolved = resolve_params(
            &params(&[("temp", json!("{{weather_data.temperature_c}}"))]),
            &context(),
        )
        .unwrap();
        assert_eq!(resolved["temp"], json!(21.5));
    }

    #[test]
    fn test_embedded_placeholder_interpolates() {
        let resolved = resolve_params(
            &params(&[("query", json!("{{weather_data.location.city}} events"))]),
            &context(),
        )
        .unwrap();
        assert_eq!(resolved["query"], json!("Tokyo events"));
    }

    #[test]
    fn test_non_placeholder_passes_through() {
        let input = params(&[
            ("n", json!(3)),
            ("flag", json!(true)),
            ("plain", json!("no braces here")),
            ("nested", json!({ "a": [1, 2] })),
        ]);
        let resolved = resolve_params(&input, &context()).unwrap();
        assert_eq!(resolved, input);
    }

    #[test]
    fn test_missing_path_names_placeholder() {
        let err = resolve_params(
            &params(&[("q", json!("{{weather_data.wind.speed}}"))]),
            &context(),
        )
        .unwrap_err();
        match err {
            ChainError::Resolution(placeholder) => {
                assert_eq!(placeholder, "{{weather_data.wind.speed}}");
            }
            other => panic!("expected Resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let input = params(&[
            ("city", json!("{{weather_data.location.city}}")),
            ("query", json!("{{weather_data.location.city}} news")),
        ]);
        let ctx = context();
        let first = resolve_params(&input, &ctx).unwrap();
        let second = resolve_params(&input, &ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unterminated_braces_are_literal() {
        let resolved = resolve_params(
            &params(&[("q", json!("{{weather_data.location.city"))]),
            &context(),
        )
        .unwrap();
        assert_eq!(resolved["q"], json!("{{weather_data.location.city"));
    }
}
