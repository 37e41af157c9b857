use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Index family a query body is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionPattern {
    Transaction,
    Error,
    Metric,
}

impl PartitionPattern {
    pub fn as_pattern(&self) -> &'static str {
        match self {
            PartitionPattern::Transaction => "apm-*-transaction-*",
            PartitionPattern::Error => "apm-*-error-*",
            PartitionPattern::Metric => "apm-*-metric-*",
        }
    }
}

/// APM field glossary: field path and its Chinese description.
pub const COMMON_FIELDS: &[(&str, &str)] = &[
    ("service.name", "服务名称"),
    ("transaction.name", "事务名称/接口名称"),
    ("transaction.duration.us", "响应时间(微秒)"),
    ("@timestamp", "时间戳"),
    ("http.response.status_code", "HTTP状态码"),
    ("error.exception.message", "错误信息"),
    ("host.name", "主机名"),
    ("labels.*", "标签字段"),
];

/// Partition patterns plus field glossary, as embedded in prompts and returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub transaction_index: String,
    pub error_index: String,
    pub metric_index: String,
    pub common_fields: BTreeMap<String, String>,
}

impl Default for SchemaDescription {
    fn default() -> Self {
        Self {
            transaction_index: PartitionPattern::Transaction.as_pattern().to_string(),
            error_index: PartitionPattern::Error.as_pattern().to_string(),
            metric_index: PartitionPattern::Metric.as_pattern().to_string(),
            common_fields: COMMON_FIELDS
                .iter()
                .map(|(field, desc)| (field.to_string(), desc.to_string()))
                .collect(),
        }
    }
}

impl SchemaDescription {
    /// Prompt-ready bullet list of the index patterns.
    pub fn index_lines(&self) -> String {
        format!(
            "- 事务数据索引: {}\n- 错误数据索引: {}\n- 指标数据索引: {}",
            self.transaction_index, self.error_index, self.metric_index
        )
    }

    /// Prompt-ready bullet list of the field glossary, in glossary order.
    pub fn field_lines(&self) -> String {
        COMMON_FIELDS
            .iter()
            .filter_map(|(field, _)| {
                self.common_fields
                    .get(*field)
                    .map(|desc| format!("- {}: {}", field, desc))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
