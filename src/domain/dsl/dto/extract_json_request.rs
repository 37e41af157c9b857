use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractJsonRequest {
    #[validate(length(min = 1))]
    pub markdown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractJsonResponse {
    pub body: Value,
    pub original: String,
}
