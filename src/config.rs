use std::env;
use std::time::Duration;

use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_ES_URL: &str = "http://localhost:9200";
const DEFAULT_ES_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_LOG_DIR: &str = "logs";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub es_url: String,
    pub es_username: Option<String>,
    pub es_password: Option<String>,
    /// Fixed budget for a single search round trip.
    pub es_timeout: Duration,
    pub default_timezone: String,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            es_url: DEFAULT_ES_URL.to_string(),
            es_username: None,
            es_password: None,
            es_timeout: Duration::from_secs(DEFAULT_ES_TIMEOUT_SECS),
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl AppConfig {
    /// Build from `APM_TEXT2DSL_*` environment variables (call `dotenvy` first).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let es_timeout = match get("APM_TEXT2DSL_ES_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        "Invalid APM_TEXT2DSL_ES_TIMEOUT_SECS={:?}, using {}s",
                        raw, DEFAULT_ES_TIMEOUT_SECS
                    );
                    defaults.es_timeout
                }
            },
            None => defaults.es_timeout,
        };

        Self {
            bind_addr: get("APM_TEXT2DSL_BIND_ADDR").unwrap_or(defaults.bind_addr),
            es_url: get("APM_TEXT2DSL_ES_URL").unwrap_or(defaults.es_url),
            es_username: get("APM_TEXT2DSL_ES_USERNAME"),
            es_password: get("APM_TEXT2DSL_ES_PASSWORD"),
            es_timeout,
            default_timezone: get("APM_TEXT2DSL_DEFAULT_TIMEZONE")
                .unwrap_or(defaults.default_timezone),
            log_dir: get("APM_TEXT2DSL_LOG_DIR").unwrap_or(defaults.log_dir),
        }
    }
}
