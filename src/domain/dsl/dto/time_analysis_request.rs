use serde::{Deserialize, Serialize};
use validator::Validate;

/// Model output (markdown or raw JSON) describing the time range it inferred.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TimeAnalysisRequest {
    #[validate(length(min = 1))]
    pub markdown: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAnalysisResponse {
    /// Always matches `^\d+[mhd]$`.
    pub time_expression: String,
    pub reasoning: String,
    pub confidence: Confidence,
}
