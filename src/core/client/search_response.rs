use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Canonical view of a search response, whatever shape the engine returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub took: u64,
    pub timed_out: bool,
    #[serde(rename = "_shards")]
    pub shards: Value,
    /// `{ "total": { "value", "relation" }, "hits": [...] }`
    pub hits: Value,
    pub aggregations: Value,
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self::from_raw(Value::Null)
    }
}

impl ExecutionResult {
    /// Normalize a raw engine response. Handles wrapped `{ "body": ... }`
    /// responses, legacy numeric `hits.total`, and missing keys.
    pub fn from_raw(raw: Value) -> Self {
        let mut root = unwrap_body(raw);

        let took = root.get("took").and_then(Value::as_u64).unwrap_or(0);
        let timed_out = root.get("timed_out").and_then(Value::as_bool).unwrap_or(false);
        let shards = take_object(&mut root, "_shards");
        let aggregations = take_object(&mut root, "aggregations");
        let hits = normalize_hits(take_object(&mut root, "hits"));

        Self {
            took,
            timed_out,
            shards,
            hits,
            aggregations,
        }
    }

    pub fn total_hits(&self) -> u64 {
        self.hits
            .pointer("/total/value")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// `false` when the engine only reported a lower bound, or skipped counting.
    pub fn total_is_exact(&self) -> bool {
        self.hits.pointer("/total/relation").and_then(Value::as_str) == Some("eq")
    }

    pub fn sampled_hits(&self) -> &[Value] {
        self.hits
            .get("hits")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn to_value(&self) -> Value {
        json!({
            "took": self.took,
            "timed_out": self.timed_out,
            "_shards": self.shards,
            "hits": self.hits,
            "aggregations": self.aggregations,
        })
    }
}

fn unwrap_body(raw: Value) -> Value {
    match raw {
        Value::Object(mut map) if !map.contains_key("hits") && !map.contains_key("took") => {
            match map.remove("body") {
                Some(inner @ Value::Object(_)) => inner,
                Some(other) => {
                    map.insert("body".into(), other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            }
        }
        other => other,
    }
}

fn take_object(root: &mut Value, key: &str) -> Value {
    match root.as_object_mut().and_then(|m| m.remove(key)) {
        Some(v @ Value::Object(_)) => v,
        _ => Value::Object(Map::new()),
    }
}

fn normalize_hits(mut hits: Value) -> Value {
    let sampled = match hits.get("hits") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let total = match hits.get("total") {
        Some(Value::Number(n)) => json!({ "value": n.as_u64().unwrap_or(0), "relation": "eq" }),
        Some(Value::Object(obj)) => json!({
            "value": obj.get("value").and_then(Value::as_u64).unwrap_or(0),
            "relation": obj.get("relation").and_then(Value::as_str).unwrap_or("eq"),
        }),
        // Total counting was skipped; report what was sampled as a lower bound.
        _ => json!({ "value": sampled.len(), "relation": "gte" }),
    };

    if let Some(map) = hits.as_object_mut() {
        map.insert("total".into(), total);
        map.insert("hits".into(), Value::Array(sampled));
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_response_is_kept() {
        let raw = json!({
            "took": 12,
            "timed_out": false,
            "_shards": {"total": 3, "successful": 3, "skipped": 0, "failed": 0},
            "hits": {"total": {"value": 42, "relation": "eq"}, "max_score": null, "hits": []},
            "aggregations": {"services": {"buckets": [{"key": "checkout", "doc_count": 40}]}}
        });
        let result = ExecutionResult::from_raw(raw);
        assert_eq!(result.took, 12);
        assert_eq!(result.total_hits(), 42);
        assert!(result.total_is_exact());
        assert_eq!(result.shards["successful"], json!(3));
        assert_eq!(result.aggregations["services"]["buckets"][0]["key"], json!("checkout"));
    }

    #[test]
    fn wrapped_body_is_unwrapped() {
        let raw = json!({"body": {"took": 7, "hits": {"total": 5, "hits": []}}, "status": 200});
        let result = ExecutionResult::from_raw(raw);
        assert_eq!(result.took, 7);
        assert_eq!(result.total_hits(), 5);
        assert_eq!(result.hits["total"]["relation"], json!("eq"));
    }

    #[test]
    fn missing_keys_default_to_empty_containers() {
        let result = ExecutionResult::from_raw(json!({}));
        assert_eq!(result.took, 0);
        assert!(!result.timed_out);
        assert_eq!(result.shards, json!({}));
        assert_eq!(result.aggregations, json!({}));
        assert_eq!(result.total_hits(), 0);
        assert!(result.sampled_hits().is_empty());
    }

    #[test]
    fn absent_total_counts_sampled_hits() {
        let raw = json!({"took": 1, "hits": {"hits": [{"_id": "a"}, {"_id": "b"}]}});
        let result = ExecutionResult::from_raw(raw);
        assert_eq!(result.total_hits(), 2);
        assert_eq!(result.hits["total"]["relation"], json!("gte"));
        assert!(!result.total_is_exact());
    }

    #[test]
    fn canonical_value_exposes_all_keys() {
        let value = ExecutionResult::default().to_value();
        for key in ["took", "timed_out", "_shards", "hits", "aggregations"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(serde_json::to_value(ExecutionResult::default()).unwrap(), value);
    }
}
