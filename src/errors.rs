//! # Error Types Module
//!
//! Error types for the ingredient extraction service and the bulk import path.
//! None of them is fatal: every failure leaves the costing table untouched.

/// Failures talking to the ingredient extraction service
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// No API key configured
    MissingApiKey,
    /// Network or HTTP failure
    Transport(String),
    /// The service refused the request (bad key, bad request)
    Rejected(String),
    /// The service answered with something that is not an ingredient list
    MalformedResponse(String),
    /// The request did not finish in time
    Timeout(String),
    /// Too many recent failures, requests are short-circuited
    CircuitOpen,
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::MissingApiKey => write!(f, "API key is not configured."),
            ExtractionError::Transport(msg) => write!(f, "Transport error: {msg}"),
            ExtractionError::Rejected(msg) => write!(f, "Request rejected: {msg}"),
            ExtractionError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            ExtractionError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            ExtractionError::CircuitOpen => {
                write!(f, "Extraction service is temporarily unavailable after repeated failures.")
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

impl ExtractionError {
    /// Whether trying the same request again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractionError::Transport(_) | ExtractionError::Timeout(_))
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractionError::Timeout(err.to_string())
        } else if err.is_decode() {
            ExtractionError::MalformedResponse(err.to_string())
        } else {
            ExtractionError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::MalformedResponse(err.to_string())
    }
}

/// Why a bulk import did not replace the costing table
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// Nothing was pasted
    EmptyText,
    /// The service returned no ingredients
    EmptyResult,
    /// The service call failed
    Extraction(ExtractionError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::EmptyText => write!(f, "Please paste a recipe first."),
            ImportError::EmptyResult => write!(
                f,
                "No ingredients could be identified. Please check your recipe text and try again."
            ),
            ImportError::Extraction(err) => write!(f, "Failed to parse recipe. {err}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Extraction(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExtractionError> for ImportError {
    fn from(err: ExtractionError) -> Self {
        ImportError::Extraction(err)
    }
}
