use anyhow::Result;
use serde_json::{json, Value};
use tracing::warn;

use crate::core::client::search_client::SearchEngine;
use crate::domain::dsl::apm_schema::SchemaDescription;

/// Probe the search engine; an unreachable cluster is reported, not raised.
pub async fn health(engine: &dyn SearchEngine) -> Result<Value> {
    match engine.ping().await {
        Ok(_) => Ok(json!({"status": "healthy", "elasticsearch": "connected"})),
        Err(e) => {
            warn!("⚠️ Elasticsearch health probe failed: {:#}", e);
            Ok(json!({"status": "unhealthy", "elasticsearch": "disconnected"}))
        }
    }
}

pub async fn schema() -> Result<SchemaDescription> {
    Ok(SchemaDescription::default())
}
