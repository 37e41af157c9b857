//! DSL controller: connects routes to the query-lifecycle pipeline

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::dsl::dto::execute_query_request::{ExecuteQueryRequest, ExecuteQueryResponse};
use crate::domain::dsl::dto::extract_json_request::{ExtractJsonRequest, ExtractJsonResponse};
use crate::domain::dsl::dto::generate_dsl_request::{GenerateDslRequest, GenerateDslResponse};
use crate::domain::dsl::dto::time_analysis_request::{TimeAnalysisRequest, TimeAnalysisResponse};
use crate::errors::AppError;

pub struct DslController;

impl DslController {
    pub async fn generate(
        State(state): State<AppState>,
        payload: Result<Json<GenerateDslRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<GenerateDslResponse>>, AppError> {
        let Json(payload) = payload?;
        to_json(state.dsl_service.generate_dsl(payload).await)
    }

    /// Pipeline failures come back inside the body with `execution_success = false`;
    /// only an undecodable request is a transport fault.
    pub async fn execute(
        State(state): State<AppState>,
        payload: Result<Json<ExecuteQueryRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<ExecuteQueryResponse>>, AppError> {
        let Json(payload) = payload?;
        Ok(Json(ApiResponse::ok(
            state.dsl_service.execute_query(payload).await,
        )))
    }

    pub async fn extract_json(
        State(state): State<AppState>,
        payload: Result<Json<ExtractJsonRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<ExtractJsonResponse>>, AppError> {
        let Json(payload) = payload?;
        to_json(state.dsl_service.extract_json(payload).await)
    }

    pub async fn analyze_time(
        State(state): State<AppState>,
        payload: Result<Json<TimeAnalysisRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<TimeAnalysisResponse>>, AppError> {
        let Json(payload) = payload?;
        to_json(state.dsl_service.analyze_time(payload).await)
    }
}
