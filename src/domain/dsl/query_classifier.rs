use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClassification {
    Performance,
    Error,
    Traffic,
    General,
}

impl QueryClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryClassification::Performance => "performance",
            QueryClassification::Error => "error",
            QueryClassification::Traffic => "traffic",
            QueryClassification::General => "general",
        }
    }
}

impl fmt::Display for QueryClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rules, evaluated first-match-wins: performance, error, traffic.
/// Anything unmatched is `General`.
const CLASSIFICATION_RULES: &[(&[&str], QueryClassification)] = &[
    (
        &["慢", "slow", "响应时间", "response time", "duration", "latency", "延迟"],
        QueryClassification::Performance,
    ),
    (
        &["错误", "error", "异常", "exception"],
        QueryClassification::Error,
    ),
    (
        &["调用", "request", "请求", "call", "traffic", "流量"],
        QueryClassification::Traffic,
    ),
];

fn classify_text(text: &str) -> QueryClassification {
    let lowered = text.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(tokens, _)| tokens.iter().any(|t| lowered.contains(t)))
        .map(|(_, tag)| *tag)
        .unwrap_or(QueryClassification::General)
}

/// Classify the caller's free-text question.
pub fn classify_question(question: &str) -> QueryClassification {
    classify_text(question)
}

/// Classify a query body by its serialized content, using the same rule table.
pub fn classify_body(body: &Value) -> QueryClassification {
    classify_text(&body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_tags() {
        assert_eq!(classify_question("哪个服务最慢"), QueryClassification::Performance);
        assert_eq!(classify_question("Show me the Errors"), QueryClassification::Error);
        assert_eq!(classify_question("接口调用次数"), QueryClassification::Traffic);
        assert_eq!(classify_question("列出所有主机"), QueryClassification::General);
    }

    #[test]
    fn performance_rule_precedes_error_rule() {
        assert_eq!(
            classify_question("slow requests with errors"),
            QueryClassification::Performance
        );
    }

    #[test]
    fn body_uses_same_table() {
        let body = json!({"aggs": {"avg_duration": {"avg": {"field": "transaction.duration.us"}}}});
        assert_eq!(classify_body(&body), QueryClassification::Performance);

        let body = json!({"query": {"exists": {"field": "error.exception.message"}}});
        assert_eq!(classify_body(&body), QueryClassification::Error);

        assert_eq!(classify_body(&json!({"size": 0})), QueryClassification::General);
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        assert_eq!(
            serde_json::to_value(QueryClassification::Traffic).unwrap(),
            json!("traffic")
        );
    }
}
