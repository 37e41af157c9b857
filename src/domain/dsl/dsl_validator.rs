use serde_json::Value;
use tracing::warn;

use super::apm_schema::PartitionPattern;
use crate::errors::PipelineError;

/// Top-level keys that make a body plausible for `_search`.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "query",
    "aggs",
    "aggregations",
    "size",
    "sort",
    "_source",
    "from",
    "highlight",
    "script_fields",
];

/// Ordered routing rules, first match wins; unmatched bodies go to transactions.
const ROUTING_RULES: &[(&[&str], PartitionPattern)] = &[
    (&["error"], PartitionPattern::Error),
    (&["transaction", "duration"], PartitionPattern::Transaction),
];

/// Shallow structural check: a JSON object with at least one recognized key.
/// Nested clauses are not inspected for well-formedness.
pub fn validate(body: &Value) -> Result<(), PipelineError> {
    let map = body
        .as_object()
        .ok_or_else(|| PipelineError::ValidationRejected("DSL must be a JSON object".into()))?;

    if !RECOGNIZED_KEYS.iter().any(|k| map.contains_key(*k)) {
        return Err(PipelineError::ValidationRejected(format!(
            "DSL has none of the recognized top-level keys ({})",
            RECOGNIZED_KEYS.join(", ")
        )));
    }

    if let Some(query) = map.get("query") {
        if !has_time_filter(query) {
            warn!("⚠️ DSL query clause has no @timestamp range filter");
        }
    }

    Ok(())
}

/// Pick the partition by substring tests on the lower-cased serialized body.
pub fn route(body: &Value) -> PartitionPattern {
    let text = body.to_string().to_lowercase();
    ROUTING_RULES
        .iter()
        .find(|(tokens, _)| tokens.iter().any(|t| text.contains(t)))
        .map(|(_, pattern)| *pattern)
        .unwrap_or(PartitionPattern::Transaction)
}

/// True when some `range` clause below `node` mentions `@timestamp`.
pub fn has_time_filter(node: &Value) -> bool {
    match node {
        Value::Object(map) => {
            if let Some(range) = map.get("range") {
                if range.to_string().contains("@timestamp") {
                    return true;
                }
            }
            map.values().any(has_time_filter)
        }
        Value::Array(items) => items.iter().any(has_time_filter),
        _ => false,
    }
}
