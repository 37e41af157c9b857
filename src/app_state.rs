use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::config::AppConfig;
use crate::core::client::search_client::{ElasticsearchClient, SearchEngine};
use crate::domain::dsl::apm_schema::SchemaDescription;
use crate::domain::dsl::dto::execute_query_request::{ExecuteQueryRequest, ExecuteQueryResponse};
use crate::domain::dsl::dto::extract_json_request::{ExtractJsonRequest, ExtractJsonResponse};
use crate::domain::dsl::dto::generate_dsl_request::{GenerateDslRequest, GenerateDslResponse};
use crate::domain::dsl::dto::time_analysis_request::{TimeAnalysisRequest, TimeAnalysisResponse};
use crate::domain::dsl::service::dsl_service;
use crate::domain::system::service::health_service;
use crate::errors::PipelineError;

#[derive(Clone)]
pub struct AppState {
    pub dsl_service: Arc<DslService>,
    pub system_service: Arc<SystemService>,
}

pub fn build_app_state(config: AppConfig) -> Result<AppState> {
    let engine: Arc<dyn SearchEngine> = Arc::new(ElasticsearchClient::new(&config)?);
    Ok(build_app_state_with_engine(config, engine))
}

/// Wire services around an already-built search engine handle.
pub fn build_app_state_with_engine(config: AppConfig, engine: Arc<dyn SearchEngine>) -> AppState {
    let config = Arc::new(config);
    AppState {
        dsl_service: Arc::new(DslService::new(engine.clone(), config)),
        system_service: Arc::new(SystemService::new(engine)),
    }
}

#[derive(Clone)]
pub struct DslService {
    engine: Arc<dyn SearchEngine>,
    config: Arc<AppConfig>,
}

impl DslService {
    pub fn new(engine: Arc<dyn SearchEngine>, config: Arc<AppConfig>) -> Self {
        Self { engine, config }
    }

    pub async fn generate_dsl(
        &self,
        req: GenerateDslRequest,
    ) -> Result<GenerateDslResponse, PipelineError> {
        dsl_service::generate_dsl(req, &self.config.default_timezone)
    }

    pub async fn execute_query(&self, req: ExecuteQueryRequest) -> ExecuteQueryResponse {
        dsl_service::execute_query(self.engine.as_ref(), self.config.es_timeout, req).await
    }

    pub async fn extract_json(
        &self,
        req: ExtractJsonRequest,
    ) -> Result<ExtractJsonResponse, PipelineError> {
        dsl_service::extract_json(req)
    }

    pub async fn analyze_time(
        &self,
        req: TimeAnalysisRequest,
    ) -> Result<TimeAnalysisResponse, PipelineError> {
        dsl_service::analyze_time(req)
    }
}

#[derive(Clone)]
pub struct SystemService {
    engine: Arc<dyn SearchEngine>,
}

impl SystemService {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }

    pub async fn health(&self) -> Result<Value> {
        health_service::health(self.engine.as_ref()).await
    }

    pub async fn schema(&self) -> Result<SchemaDescription> {
        health_service::schema().await
    }
}
