use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Transport-level failures rendered as `{ "message": ... }` bodies.
#[allow(dead_code)]
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Body parsing error: {0}")]
    BodyParsingError(String),

    #[error("Search engine error: {0}")]
    SearchEngineError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Helper for mapping any unknown error into internal error
pub fn internal_error<E: ToString>(err: E) -> AppError {
    AppError::InternalServerError(err.to_string())
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        internal_error(err)
    }
}

/// Undecodable or mistyped request bodies.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BodyParsingError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BodyParsingError(_) => StatusCode::BAD_REQUEST,
            AppError::SearchEngineError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Failures raised inside the query-lifecycle pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No structured document could be recovered; carries the parser diagnostic.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("no query body supplied (dsl, dsl_body and markdown are all absent)")]
    MissingQueryBody,

    #[error("DSL validation failed: {0}")]
    ValidationRejected(String),

    #[error("search execution failed: {0}")]
    ExecutionError(String),

    #[error("invalid time analysis: {0}")]
    InvalidTimeAnalysis(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ExecutionError(_) => AppError::SearchEngineError(err.to_string()),
            PipelineError::MalformedPayload(_)
            | PipelineError::MissingQueryBody
            | PipelineError::ValidationRejected(_)
            | PipelineError::InvalidTimeAnalysis(_)
            | PipelineError::InvalidRequest(_) => AppError::BodyParsingError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_status_codes() {
        let resp = AppError::from(PipelineError::MalformedPayload("eof".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::from(PipelineError::ExecutionError("timeout".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn malformed_payload_keeps_diagnostic() {
        let err = PipelineError::MalformedPayload("expected value at line 1 column 1".into());
        assert!(err.to_string().contains("line 1 column 1"));
    }
}
