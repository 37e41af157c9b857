use serde_json::Value;

use super::payload_extractor;
use crate::errors::PipelineError;

/// The alternative representations a caller may supply for one query body.
#[derive(Debug, Clone, Default)]
pub struct QueryBodyCandidates {
    pub primary: Option<Value>,
    pub secondary: Option<Value>,
    pub markdown: Option<String>,
}

/// Pick exactly one body: primary, then secondary, then markdown via the extractor.
/// The first present candidate wins even when it is an empty object.
pub fn resolve_body(candidates: QueryBodyCandidates) -> Result<Value, PipelineError> {
    if let Some(body) = candidates.primary {
        return Ok(body);
    }
    if let Some(body) = candidates.secondary {
        return Ok(body);
    }
    match candidates.markdown {
        Some(text) => payload_extractor::extract(&text),
        None => Err(PipelineError::MissingQueryBody),
    }
}
