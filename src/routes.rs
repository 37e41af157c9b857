use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use crate::app_state::AppState;

/// Build the main application router
pub fn app_router() -> Router<AppState> {
    // DSL and System subrouters live under /api/v1
    let api_v1 = Router::new()
        .nest("/dsl", crate::api::routes::dsl_routes::dsl_routes())
        .nest("/system", crate::api::routes::system_routes::system_routes());

    Router::new()
        // Root route
        .route("/", get(root))
        // Health check
        .route("/health", get(health_check))
        // API v1
        .nest("/api/v1", api_v1)

        // Fallback handler for 404
        .fallback(handler_404)
        .layer(CorsLayer::very_permissive())
}

// Handler for root
async fn root() -> &'static str {
    "Server is running!"
}

// Handler for health check
async fn health_check() -> &'static str {
    "OK"
}

// Handler for 404 Not Found
async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app_state::build_app_state_with_engine;
    use crate::config::AppConfig;
    use crate::domain::dsl::query_executor::tests::MockSearchEngine;

    fn app(engine: MockSearchEngine) -> Router {
        let state = build_app_state_with_engine(AppConfig::default(), Arc::new(engine));
        app_router().with_state(state)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn generate_returns_prompt_envelope() {
        let (status, body) = post_json(
            app(MockSearchEngine::ok(json!({}))),
            "/api/v1/dsl/generate",
            json!({"query": "最近1小时错误最多的服务", "time_range": "1h", "timezone": "Asia/Shanghai"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_successful"], json!(true));
        assert_eq!(body["data"]["query_type"], json!("error"));
        assert_eq!(body["data"]["timezone"], json!("Asia/Shanghai"));
        assert_eq!(body["data"]["schema_info"]["transaction_index"], json!("apm-*-transaction-*"));
    }

    #[tokio::test]
    async fn execute_failure_is_still_200() {
        let (status, body) = post_json(
            app(MockSearchEngine::failing("connection refused")),
            "/api/v1/dsl/execute",
            json!({"dsl": {"size": 0, "aggs": {}}, "original_query": "调用量"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["execution_success"], json!(false));
        assert!(body["data"]["error_message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn extract_json_rejects_prose_with_400() {
        let (status, body) = post_json(
            app(MockSearchEngine::ok(json!({}))),
            "/api/v1/dsl/extract-json",
            json!({"markdown": "sorry, I cannot help"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("malformed payload"));
    }

    async fn post_raw(app: Router, uri: &str, raw: &'static str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn undecodable_body_is_400_with_message() {
        for uri in [
            "/api/v1/dsl/generate",
            "/api/v1/dsl/execute",
            "/api/v1/dsl/extract-json",
            "/api/v1/dsl/analyze-time",
        ] {
            let (status, body) = post_raw(app(MockSearchEngine::ok(json!({}))), uri, "{not json").await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(
                body["message"].as_str().unwrap().starts_with("Body parsing error"),
                "{uri}: {body}"
            );
        }
    }

    #[tokio::test]
    async fn missing_required_field_is_400_with_message() {
        let (status, body) = post_json(
            app(MockSearchEngine::ok(json!({}))),
            "/api/v1/dsl/generate",
            json!({"time_range": "1h"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("query"));
    }

    #[tokio::test]
    async fn analyze_time_round_trips_valid_analysis() {
        let (status, body) = post_json(
            app(MockSearchEngine::ok(json!({}))),
            "/api/v1/dsl/analyze-time",
            json!({"markdown": "```json\n{\"time_expression\": \"30m\", \"reasoning\": \"半小时\", \"confidence\": \"medium\"}\n```"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["time_expression"], json!("30m"));
        assert_eq!(body["data"]["confidence"], json!("medium"));
    }

    #[tokio::test]
    async fn system_health_reports_disconnected_engine() {
        let req = Request::builder()
            .uri("/api/v1/system/health")
            .body(Body::empty())
            .unwrap();
        let resp = app(MockSearchEngine::failing("down")).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["status"], json!("unhealthy"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let resp = app(MockSearchEngine::ok(json!({}))).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
