use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::AppConfig;

/// Extra time the HTTP layer waits past the server-side search timeout.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Outbound search engine operations used by the pipeline.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run `body` against `index_pattern`. With `lenient`, missing or closed
    /// indices match zero documents instead of failing the request.
    async fn search(
        &self,
        index_pattern: &str,
        body: &Value,
        timeout: Duration,
        lenient: bool,
    ) -> Result<Value>;

    /// Lightweight cluster info probe.
    async fn ping(&self) -> Result<Value>;
}

/// Elasticsearch REST client; cheap to clone and shared across requests.
#[derive(Clone)]
pub struct ElasticsearchClient {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.es_timeout + HTTP_TIMEOUT_SLACK)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.es_url.trim_end_matches('/').to_string(),
            username: config.es_username.clone(),
            password: config.es_password.clone(),
        })
    }

    fn search_url(&self, index_pattern: &str, timeout: Duration, lenient: bool) -> String {
        let mut url = format!(
            "{}/{}/_search?timeout={}ms",
            self.base_url,
            urlencoding::encode(index_pattern),
            timeout.as_millis()
        );
        if lenient {
            url.push_str("&ignore_unavailable=true&allow_no_indices=true");
        }
        url
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(user) => req.basic_auth(user, self.password.as_deref()),
            None => req,
        }
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchClient {
    async fn search(
        &self,
        index_pattern: &str,
        body: &Value,
        timeout: Duration,
        lenient: bool,
    ) -> Result<Value> {
        let url = self.search_url(index_pattern, timeout, lenient);
        debug!("POST {}", url);

        let resp = self
            .with_auth(self.client.post(&url))
            .timeout(timeout + HTTP_TIMEOUT_SLACK)
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to call Elasticsearch (url={}): {}", url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Elasticsearch returned {}: {}", status, text));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| anyhow!("Failed to decode Elasticsearch response: {}", e))
    }

    async fn ping(&self) -> Result<Value> {
        let resp = self
            .with_auth(self.client.get(&self.base_url))
            .send()
            .await
            .map_err(|e| anyhow!("Elasticsearch unreachable at {}: {}", self.base_url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("Elasticsearch ping returned {}", status));
        }

        Ok(resp.json::<Value>().await.unwrap_or(Value::Null))
    }
}
