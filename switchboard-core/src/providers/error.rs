//! Provider error types and handling

use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when talking to an upstream LLM provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out: a client-side timeout, or an upstream 408/504
    #[error("Request timed out")]
    Timeout { status: Option<u16> },

    /// Authentication failed (401/403)
    #[error("Authentication failed: {message}")]
    Authentication { status: u16, message: String },

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// Invalid request (400 and other non-specific 4xx)
    #[error("Invalid request ({status}): {message}")]
    InvalidRequest { status: u16, message: String },

    /// Model or endpoint not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Service temporarily unavailable (503)
    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other 5xx response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Response decoded but carried no text content
    #[error("Provider response contained no content")]
    EmptyResponse,

    /// No credentials configured for the provider
    #[error("Missing API key for provider: {0}")]
    MissingApiKey(String),
}

impl ProviderError {
    /// HTTP status behind this error, when there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => Some(*status),
            Self::Timeout { status } => *status,
            Self::RateLimit { .. } => Some(429),
            Self::InvalidRequest { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::ServiceUnavailable(_) => Some(503),
            Self::Server { status, .. } => Some(*status),
            Self::Network(_)
            | Self::Parse(_)
            | Self::EmptyResponse
            | Self::MissingApiKey(_) => None,
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}
