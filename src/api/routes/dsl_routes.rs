//! DSL routes (e.g., /api/v1/dsl/*)

use axum::{routing::post, Router};

use crate::api::controller::dsl::DslController;
use crate::app_state::AppState;

pub fn dsl_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(DslController::generate))
        .route("/execute", post(DslController::execute))
        .route("/extract-json", post(DslController::extract_json))
        .route("/analyze-time", post(DslController::analyze_time))
}
