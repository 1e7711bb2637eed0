//! HTTP client module for making API requests to LLM providers
//!
//! This module implements the HTTP layer, handling:
//! - Connection pooling and client management
//! - Provider-specific URLs and auth headers
//! - Status code to [`ProviderError`] mapping
//! - Call id correlation headers

pub mod client;
pub mod error;

use crate::providers::adapter::Provider;
use crate::providers::error::ProviderError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Options for a single HTTP request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Caller's call id, sent as `X-Request-ID`
    pub request_id: String,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RequestOptions {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Default::default()
        }
    }

    /// Set the timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trait for HTTP executors
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// POST `body` to the provider's chat endpoint and return the decoded JSON
    async fn execute_json(
        &self,
        provider: &dyn Provider,
        api_key: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<Value, ProviderError>;
}
