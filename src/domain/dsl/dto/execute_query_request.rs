use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::domain::dsl::body_resolver::QueryBodyCandidates;
use crate::domain::dsl::query_classifier::QueryClassification;

/// A candidate DSL body in up to three shapes plus the question it answers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteQueryRequest {
    pub dsl: Option<Value>,
    pub dsl_body: Option<Value>,
    #[serde(alias = "dsl_markdown")]
    pub markdown: Option<String>,
    #[serde(default, alias = "question")]
    pub original_query: String,
}

impl ExecuteQueryRequest {
    pub fn candidates(&self) -> QueryBodyCandidates {
        QueryBodyCandidates {
            primary: self.dsl.clone(),
            secondary: self.dsl_body.clone(),
            markdown: self.markdown.clone(),
        }
    }
}

/// Always returned with HTTP 200; failures set `execution_success = false`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteQueryResponse {
    pub raw_results: Value,
    pub analysis_prompt: String,
    pub query_type: Option<QueryClassification>,
    pub index_pattern: Option<String>,
    pub query_executed_at: String,
    pub execution_success: bool,
    pub error_message: Option<String>,
}
