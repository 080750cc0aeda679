use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ai::gemini::{DEFAULT_BASE_URL as GEMINI_BASE_URL, DEFAULT_MODEL as GEMINI_MODEL};
use crate::hosting::github::DEFAULT_API_URL as GITHUB_API_URL;
use crate::types::config::{RetryPolicy, ScribeConfig};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub github_api_url: String,
    /// JSON file backing the credential store
    pub store_path: PathBuf,
    /// Directory for local artifacts
    pub artifact_dir: PathBuf,
    pub code_retry_delay: Duration,
    pub code_retry_max: u32,
    pub navigation_settle: Duration,
    pub explain_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = ScribeConfig::default();

        Ok(Self {
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| GEMINI_MODEL.to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| GEMINI_BASE_URL.to_string()),
            github_api_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| GITHUB_API_URL.to_string()),
            store_path: env::var("JUDGE_SCRIBE_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".judge-scribe/store.json")),
            artifact_dir: env::var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("artifacts")),
            code_retry_delay: Duration::from_millis(
                parse_var("CODE_RETRY_DELAY_MS", defaults.code_retry.delay.as_millis() as u64)
                    .context("CODE_RETRY_DELAY_MS must be a number of milliseconds")?,
            ),
            code_retry_max: parse_var("CODE_RETRY_MAX", defaults.code_retry.max_retries)
                .context("CODE_RETRY_MAX must be a valid number")?,
            navigation_settle: Duration::from_millis(
                parse_var("NAVIGATION_SETTLE_MS", defaults.navigation_settle.as_millis() as u64)
                    .context("NAVIGATION_SETTLE_MS must be a number of milliseconds")?,
            ),
            explain_timeout: Duration::from_secs(
                parse_var("EXPLAIN_TIMEOUT_SECS", defaults.explain_timeout.as_secs())
                    .context("EXPLAIN_TIMEOUT_SECS must be a number of seconds")?,
            ),
        })
    }

    /// Session tunables derived from this configuration.
    pub fn scribe_config(&self) -> ScribeConfig {
        ScribeConfig::new()
            .with_code_retry(RetryPolicy::new(self.code_retry_delay, self.code_retry_max))
            .with_navigation_settle(self.navigation_settle)
            .with_explain_timeout(self.explain_timeout)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => Ok(value.trim().parse()?),
        Err(_) => Ok(default),
    }
}
