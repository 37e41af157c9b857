// src/domain/dsl/service/dsl_service.rs
use std::time::Duration;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;
use validator::Validate;

use crate::core::client::search_client::SearchEngine;
use crate::domain::dsl::apm_schema::SchemaDescription;
use crate::domain::dsl::body_resolver;
use crate::domain::dsl::dsl_validator;
use crate::domain::dsl::dto::execute_query_request::{ExecuteQueryRequest, ExecuteQueryResponse};
use crate::domain::dsl::dto::extract_json_request::{ExtractJsonRequest, ExtractJsonResponse};
use crate::domain::dsl::dto::generate_dsl_request::{GenerateDslRequest, GenerateDslResponse};
use crate::domain::dsl::dto::time_analysis_request::{
    Confidence, TimeAnalysisRequest, TimeAnalysisResponse,
};
use crate::domain::dsl::payload_extractor;
use crate::domain::dsl::prompt_composer;
use crate::domain::dsl::query_classifier::{self, QueryClassification};
use crate::domain::dsl::query_executor;
use crate::domain::time::time_window;
use crate::errors::PipelineError;

static TIME_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+[mhd]$").expect("time expression pattern is a valid regex"));

/// Resolve the window and build the DSL generation prompt.
pub fn generate_dsl(
    req: GenerateDslRequest,
    default_timezone: &str,
) -> Result<GenerateDslResponse, PipelineError> {
    req.validate()
        .map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;

    let tz_name = req.timezone.as_deref().unwrap_or(default_timezone);
    let window = time_window::resolve(&req.time_range, tz_name);
    let schema = SchemaDescription::default();
    let prompt = prompt_composer::compose_generation_prompt(&req.query, &window, &schema);
    let query_type = query_classifier::classify_question(&req.query);

    debug!(
        "Generation prompt ready (type={}, window={}, span={}m)",
        query_type,
        window.describe(),
        window.span().num_minutes()
    );

    Ok(GenerateDslResponse {
        prompt,
        query_type,
        time_range_info: window.describe(),
        start_time: window.start.to_rfc3339(),
        end_time: window.end.to_rfc3339(),
        timezone: window.timezone.name().to_string(),
        schema_info: schema,
    })
}

/// Resolve, validate, route and run a candidate DSL, then build the analysis
/// prompt. Pipeline failures are reported in the response, never raised.
pub async fn execute_query(
    engine: &dyn SearchEngine,
    timeout: Duration,
    req: ExecuteQueryRequest,
) -> ExecuteQueryResponse {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("execute_query", %request_id);
    run_pipeline(engine, timeout, req).instrument(span).await
}

async fn run_pipeline(
    engine: &dyn SearchEngine,
    timeout: Duration,
    req: ExecuteQueryRequest,
) -> ExecuteQueryResponse {
    let body = match body_resolver::resolve_body(req.candidates()) {
        Ok(body) => body,
        Err(e) => {
            warn!("⚠️ Query body rejected: {}", e);
            return failed(e, None, None);
        }
    };

    if let Err(e) = dsl_validator::validate(&body) {
        warn!("⚠️ {}", e);
        return failed(e, None, None);
    }

    let query_type = if req.original_query.trim().is_empty() {
        query_classifier::classify_body(&body)
    } else {
        query_classifier::classify_question(&req.original_query)
    };

    let execution = match query_executor::execute(engine, &body, timeout).await {
        Ok(execution) => execution,
        Err(e) => {
            let pattern = dsl_validator::route(&body).as_pattern().to_string();
            return failed(e, Some(query_type), Some(pattern));
        }
    };

    info!(
        "✅ DSL executed on {} (took={}ms, total={})",
        execution.partition.as_pattern(),
        execution.result.took,
        execution.result.total_hits()
    );

    let analysis_prompt =
        prompt_composer::compose_analysis_prompt(&req.original_query, &execution.result, query_type);

    ExecuteQueryResponse {
        raw_results: execution.result.to_value(),
        analysis_prompt,
        query_type: Some(query_type),
        index_pattern: Some(execution.partition.as_pattern().to_string()),
        query_executed_at: Utc::now().to_rfc3339(),
        execution_success: true,
        error_message: None,
    }
}

fn failed(
    err: PipelineError,
    query_type: Option<QueryClassification>,
    index_pattern: Option<String>,
) -> ExecuteQueryResponse {
    ExecuteQueryResponse {
        raw_results: Value::Object(Map::new()),
        analysis_prompt: String::new(),
        query_type,
        index_pattern,
        query_executed_at: Utc::now().to_rfc3339(),
        execution_success: false,
        error_message: Some(err.to_string()),
    }
}

/// Recover a JSON document from model output.
pub fn extract_json(req: ExtractJsonRequest) -> Result<ExtractJsonResponse, PipelineError> {
    req.validate()
        .map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;

    let body = payload_extractor::extract(&req.markdown)?;
    Ok(ExtractJsonResponse {
        body,
        original: req.markdown,
    })
}

/// Parse and check the model's time-range analysis.
pub fn analyze_time(req: TimeAnalysisRequest) -> Result<TimeAnalysisResponse, PipelineError> {
    req.validate()
        .map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;

    let doc = payload_extractor::extract(&req.markdown)?;
    let map = doc
        .as_object()
        .ok_or_else(|| PipelineError::InvalidTimeAnalysis("expected a JSON object".into()))?;

    let time_expression = required_str(map, "time_expression")?.trim().to_string();
    if !TIME_EXPRESSION.is_match(&time_expression) {
        return Err(PipelineError::InvalidTimeAnalysis(format!(
            "time_expression {:?} must look like 15m, 2h or 7d",
            time_expression
        )));
    }

    let reasoning = required_str(map, "reasoning")?.to_string();

    let confidence = match required_str(map, "confidence")?.trim().to_lowercase().as_str() {
        "high" => Confidence::High,
        "medium" => Confidence::Medium,
        "low" => Confidence::Low,
        other => {
            return Err(PipelineError::InvalidTimeAnalysis(format!(
                "confidence {:?} must be one of high, medium, low",
                other
            )))
        }
    };

    Ok(TimeAnalysisResponse {
        time_expression,
        reasoning,
        confidence,
    })
}

fn required_str<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a str, PipelineError> {
    map.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| PipelineError::InvalidTimeAnalysis(format!("missing string field `{}`", field)))
}
