use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::dsl::apm_schema::SchemaDescription;
use crate::domain::dsl::query_classifier::QueryClassification;

fn default_time_range() -> String {
    "15m".to_string()
}

/// Natural-language question plus a trailing time expression.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateDslRequest {
    #[serde(alias = "question")]
    #[validate(length(min = 1))]
    pub query: String,
    /// e.g. `15m`, `2 hours`, `最近1小时`
    #[serde(default = "default_time_range")]
    pub time_range: String,
    /// IANA zone; the configured default when omitted.
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDslResponse {
    pub prompt: String,
    pub query_type: QueryClassification,
    pub time_range_info: String,
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
    pub schema_info: SchemaDescription,
}
