//! # Application Configuration
//!
//! Settings read from the environment (optionally through a `.env` file).
//!
//! | Variable | Default |
//! |---|---|
//! | `FOOD_COSTING_DB` | `food_costing.db` |
//! | `GEMINI_API_KEY` | unset, import disabled |
//! | `GEMINI_MODEL` | `gemini-2.5-flash` |
//! | `GEMINI_ENDPOINT` | `https://generativelanguage.googleapis.com` |
//! | `FOOD_COSTING_CURRENCY` | `₱` |

use std::env;
use std::path::PathBuf;

use log::info;

use crate::export::DEFAULT_CURRENCY_SYMBOL;
use crate::extraction_config::{ExtractionConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

pub const DEFAULT_DATABASE_PATH: &str = "food_costing.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub extraction: ExtractionConfig,
    pub currency_symbol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            extraction: ExtractionConfig::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env file");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let extraction = ExtractionConfig {
            api_key: var("GEMINI_API_KEY"),
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: var("GEMINI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            ..ExtractionConfig::default()
        };

        Self {
            database_path: var("FOOD_COSTING_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            extraction,
            currency_symbol: var("FOOD_COSTING_CURRENCY")
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.database_path, PathBuf::from("food_costing.db"));
        assert_eq!(config.extraction.api_key, None);
        assert_eq!(config.extraction.model, DEFAULT_MODEL);
        assert_eq!(config.currency_symbol, "₱");
    }

    #[test]
    fn test_values_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("FOOD_COSTING_DB", "/tmp/costing.db"),
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("FOOD_COSTING_CURRENCY", "$"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, PathBuf::from("/tmp/costing.db"));
        assert_eq!(config.extraction.api_key.as_deref(), Some("secret"));
        assert_eq!(config.extraction.model, "gemini-2.0-flash");
        assert_eq!(config.extraction.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = AppConfig::from_lookup(|key| (key == "GEMINI_API_KEY").then(|| "  ".to_string()));
        assert_eq!(config.extraction.api_key, None);
    }
}
