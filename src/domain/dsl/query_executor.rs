use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use super::apm_schema::PartitionPattern;
use super::dsl_validator;
use crate::core::client::search_client::SearchEngine;
use crate::core::client::search_response::ExecutionResult;
use crate::errors::PipelineError;

/// A completed search and the partition it ran against.
#[derive(Debug, Clone)]
pub struct QueryExecution {
    pub partition: PartitionPattern,
    pub result: ExecutionResult,
}

/// Route `body`, run it once within `timeout`, and normalize the response.
/// The body is sent as written, so hit counting follows the engine default
/// (exact up to 10k) unless the body sets `track_total_hits` itself.
/// Any engine or transport failure becomes `ExecutionError`; nothing is retried.
pub async fn execute(
    engine: &dyn SearchEngine,
    body: &Value,
    timeout: Duration,
) -> Result<QueryExecution, PipelineError> {
    let partition = dsl_validator::route(body);
    debug!("Executing DSL against {}", partition.as_pattern());

    let call = engine.search(partition.as_pattern(), body, timeout, true);
    let raw = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            error!("❌ Search against {} failed: {:#}", partition.as_pattern(), e);
            return Err(PipelineError::ExecutionError(format!("{:#}", e)));
        }
        Err(_) => {
            error!(
                "❌ Search against {} timed out after {:?}",
                partition.as_pattern(),
                timeout
            );
            return Err(PipelineError::ExecutionError(format!(
                "search timed out after {}ms",
                timeout.as_millis()
            )));
        }
    };

    Ok(QueryExecution {
        partition,
        result: ExecutionResult::from_raw(raw),
    })
}
