//! Application configuration
//!
//! All knobs come from the environment with working defaults so the crate
//! runs against a local backend out of the box.

use crate::error::{AppError, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Default backend address for local development
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the research backend API
    pub base_url: Url,

    /// Delay before the first status poll of a refresh job
    pub poll_initial_delay: Duration,

    /// Delay between the end of one status poll and the start of the next
    pub poll_interval: Duration,

    /// Timeout applied to ordinary API requests
    pub request_timeout: Duration,

    /// Timeout applied to batch analysis and report generation.
    /// Analysis is expected to take minutes, not seconds.
    pub analyze_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let raw_url =
            env::var("RESEARCH_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url)
            .map_err(|e| AppError::Config(format!("Invalid RESEARCH_BACKEND_URL: {}", e)))?;

        let poll_initial_delay = duration_from_env("RESEARCH_POLL_INITIAL_DELAY_MS", 1_000)?;
        let poll_interval = duration_from_env("RESEARCH_POLL_INTERVAL_MS", 3_000)?;
        let request_timeout = duration_from_env("RESEARCH_REQUEST_TIMEOUT_MS", 30_000)?;
        let analyze_timeout = duration_from_env("RESEARCH_ANALYZE_TIMEOUT_MS", 600_000)?;

        Ok(Self {
            base_url,
            poll_initial_delay,
            poll_interval,
            request_timeout,
            analyze_timeout,
        })
    }

    /// Configuration pointing at a specific backend, with default timings
    pub fn for_backend(base_url: Url) -> Self {
        Self {
            base_url,
            poll_initial_delay: Duration::from_millis(1_000),
            poll_interval: Duration::from_millis(3_000),
            request_timeout: Duration::from_millis(30_000),
            analyze_timeout: Duration::from_millis(600_000),
        }
    }
}

fn duration_from_env(key: &str, default_ms: u64) -> Result<Duration> {
    match env::var(key) {
        Ok(raw) => {
            let ms: u64 = raw
                .parse()
                .map_err(|_| AppError::Config(format!("{} must be milliseconds, got {:?}", key, raw)))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(Duration::from_millis(default_ms)),
    }
}
