//! # Ingredient Extraction Module
//!
//! Client for the external service that turns free recipe text into a list of
//! `{name, quantity, unit}` triples. The service output is untrusted: every
//! field is optional here and gets defaulted during import.
//!
//! ## Features
//!
//! - [`IngredientExtractor`] trait so the costing session can be driven by any producer
//! - [`GeminiExtractor`] backed by the Gemini `generateContent` API with a JSON response schema
//! - Retries with exponential backoff and jitter, per-request timeout, circuit breaker

use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::circuit_breaker::CircuitBreaker;
use crate::errors::ExtractionError;
use crate::extraction_config::{ExtractionConfig, RecoveryConfig};

/// One ingredient as reported by the extraction service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl ParsedIngredient {
    pub fn new(name: &str, quantity: f64, unit: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            quantity: Some(quantity),
            unit: Some(unit.to_string()),
        }
    }
}

/// Accept numbers, numeric strings and null for a quantity
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Producer of ingredient triples from free recipe text
pub trait IngredientExtractor {
    fn extract(
        &self,
        recipe_text: &str,
    ) -> impl Future<Output = Result<Vec<ParsedIngredient>, ExtractionError>> + Send;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Build the prompt sent to the model
pub fn build_prompt(recipe_text: &str) -> String {
    format!(
        "Analyze the following recipe text and extract a list of all ingredients, \
         including their quantities and units of measurement. \n\nRecipe:\n{recipe_text}"
    )
}

/// Build the JSON body of a `generateContent` request
pub fn build_request_body(recipe_text: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": build_prompt(recipe_text) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "description": "A list of ingredients from the recipe.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "The name of the ingredient, e.g., 'all-purpose flour'." },
                        "quantity": { "type": "NUMBER", "description": "The quantity of the ingredient, e.g., 2.5." },
                        "unit": { "type": "STRING", "description": "The unit of measurement, e.g., 'cups', 'g', 'tsp', 'pc'." }
                    },
                    "required": ["name", "quantity", "unit"]
                }
            }
        }
    })
}

/// Pull the ingredient list out of a `generateContent` response body
pub fn parse_generate_response(body: &str) -> Result<Vec<ParsedIngredient>, ExtractionError> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.text)
        .ok_or_else(|| ExtractionError::MalformedResponse("response contains no text".to_string()))?;

    let ingredients: Vec<ParsedIngredient> = serde_json::from_str(text.trim())?;
    debug!("Service returned {} ingredient(s)", ingredients.len());
    Ok(ingredients)
}

/// Delay before retry number `attempt` (0-based): exponential, capped, with up to 25% jitter
pub fn calculate_retry_delay(attempt: u32, config: &RecoveryConfig) -> Duration {
    let exponential = config
        .base_retry_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    let capped = exponential.min(config.max_retry_delay_ms);
    let jitter = if capped >= 4 {
        rand::thread_rng().gen_range(0..=capped / 4)
    } else {
        0
    };
    Duration::from_millis(capped.saturating_sub(jitter))
}

/// Extraction through the Gemini generative language API
#[derive(Debug)]
pub struct GeminiExtractor {
    client: reqwest::Client,
    config: ExtractionConfig,
    breaker: CircuitBreaker,
}

impl GeminiExtractor {
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.recovery.operation_timeout_secs))
            .build()?;
        let breaker = CircuitBreaker::new(config.recovery.clone());
        Ok(Self {
            client,
            config,
            breaker,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    async fn request_once(
        &self,
        api_key: &str,
        recipe_text: &str,
    ) -> Result<Vec<ParsedIngredient>, ExtractionError> {
        let response = self
            .client
            .post(self.config.generate_url())
            .query(&[("key", api_key)])
            .json(&build_request_body(recipe_text))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExtractionError::Transport(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(ExtractionError::Rejected(format!("HTTP {status}: {body}")));
        }

        parse_generate_response(&body)
    }
}

impl IngredientExtractor for GeminiExtractor {
    async fn extract(&self, recipe_text: &str) -> Result<Vec<ParsedIngredient>, ExtractionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ExtractionError::MissingApiKey)?;

        if self.breaker.is_open() {
            warn!("Extraction circuit is open, refusing request");
            return Err(ExtractionError::CircuitOpen);
        }

        let recovery = &self.config.recovery;
        let mut attempt = 0;
        loop {
            info!(
                "Requesting ingredient extraction from {} (attempt {})",
                self.config.model,
                attempt + 1
            );

            match self.request_once(api_key, recipe_text).await {
                Ok(ingredients) => {
                    self.breaker.record_success();
                    return Ok(ingredients);
                }
                Err(err) if err.is_retryable() && attempt < recovery.max_retries => {
                    self.breaker.record_failure();
                    let delay = calculate_retry_delay(attempt, recovery);
                    warn!("Extraction attempt {} failed: {}, retrying in {:?}", attempt + 1, err, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        self.breaker.record_failure();
                    }
                    warn!("Extraction failed: {}", err);
                    return Err(err);
                }
            }
        }
    }
}
