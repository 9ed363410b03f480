//! # Extraction Configuration Module
//!
//! Settings for the ingredient extraction service client: where to reach it,
//! which model to ask, and how to retry and back off on failures.

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Retry, timeout and circuit breaker settings for service calls
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// First backoff step, doubled on every retry
    pub base_retry_delay_ms: u64,
    /// Upper bound of a single backoff step
    pub max_retry_delay_ms: u64,
    /// Per-request timeout
    pub operation_timeout_secs: u64,
    /// Consecutive failures that open the breaker
    pub circuit_breaker_threshold: u32,
    /// How long an open breaker rejects calls
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1_000,
            max_retry_delay_ms: 10_000,
            operation_timeout_secs: 30,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60,
        }
    }
}

/// Configuration for the extraction service client
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// API key; requests fail with `MissingApiKey` when absent
    pub api_key: Option<String>,
    /// Model name, e.g. "gemini-2.5-flash"
    pub model: String,
    /// Base URL of the generative language API
    pub endpoint: String,
    /// Recovery and error handling configuration
    pub recovery: RecoveryConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl ExtractionConfig {
    /// Full URL of the content generation call
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}
