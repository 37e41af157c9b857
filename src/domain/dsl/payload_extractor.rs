use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::errors::PipelineError;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern is a valid regex"));

/// Recover a JSON document from raw text, a fenced markdown block, or
/// lightly damaged JSON (full-width punctuation, trailing commas).
pub fn extract(text: &str) -> Result<Value, PipelineError> {
    let candidate = candidate_document(text.trim());

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Ok(value),
        Err(original) => {
            let repaired = repair(candidate);
            debug!("Strict JSON parse failed ({}), retrying after repair", original);
            serde_json::from_str::<Value>(&repaired)
                .map_err(|_| PipelineError::MalformedPayload(original.to_string()))
        }
    }
}

/// Select the slice of `text` that should hold the document.
fn candidate_document(text: &str) -> &str {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();

    if let Some(start) = lowered.find(JSON_FENCE) {
        return fenced_body(text, start + JSON_FENCE.len(), false);
    }

    if let Some(start) = lowered.find(FENCE) {
        return fenced_body(text, start + FENCE.len(), true);
    }

    text
}

/// Content from `body_start` up to the next fence (or end of text).
fn fenced_body(text: &str, body_start: usize, skip_info_string: bool) -> &str {
    let mut rest = &text[body_start..];

    if skip_info_string {
        if let Some(newline) = rest.find('\n') {
            let info = rest[..newline].trim();
            if !info.is_empty() && info.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                rest = &rest[newline + 1..];
            }
        }
    }

    let end = rest.find(FENCE).unwrap_or(rest.len());
    rest[..end].trim()
}

fn repair(candidate: &str) -> String {
    let ascii = candidate.replace('，', ",").replace('：', ":");
    TRAILING_COMMA.replace_all(&ascii, "$1").into_owned()
}
