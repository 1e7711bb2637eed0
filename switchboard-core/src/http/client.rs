//! HTTP client implementation using reqwest

use crate::config::ConnectionConfig;
use crate::http::error::{map_http_error, scrub_secret};
use crate::http::{HttpExecutor, RequestOptions};
use crate::providers::adapter::Provider;
use crate::providers::error::ProviderError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("switchboard/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_config(&ConnectionConfig::default())
    }

    /// Create a new HTTP client from connection settings
    pub fn with_config(config: &ConnectionConfig) -> Result<Self, ProviderError> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Build the full URL for a provider
    fn build_url(provider: &dyn Provider) -> String {
        format!("{}{}", provider.base_url(), provider.endpoint())
    }

    /// Validate response content type
    fn validate_content_type(response: &Response) -> Result<(), ProviderError> {
        if let Some(content_type) = response.headers().get("content-type") {
            let content_type_str = content_type.to_str().unwrap_or("").to_lowercase();

            if !content_type_str.contains("application/json") {
                return Err(ProviderError::Parse(format!(
                    "Expected application/json, got: {}",
                    content_type_str
                )));
            }
        }

        Ok(())
    }

    /// Check response size to prevent OOM
    fn check_content_length(&self, response: &Response) -> Result<(), ProviderError> {
        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(ProviderError::Parse(format!(
                    "Response size {} exceeds maximum {}",
                    content_length, self.max_response_size
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl HttpExecutor for HttpClient {
    async fn execute_json(
        &self,
        provider: &dyn Provider,
        api_key: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<Value, ProviderError> {
        let request_id = options.request_id.as_str();
        let url = Self::build_url(provider);

        debug!("POST {} [request_id: {}]", url, request_id);

        let mut req_builder = self.client.post(&url).timeout(options.timeout).json(body);

        for (key, value) in provider.headers(api_key) {
            req_builder = req_builder.header(key, value);
        }

        // Correlate upstream logs with the caller's call id
        req_builder = req_builder.header("X-Request-ID", request_id);

        let response = req_builder.send().await.map_err(|e| {
            let detail = scrub_secret(&e.to_string(), api_key);
            if e.is_timeout() {
                warn!("Request timeout for {} [request_id: {}]", provider.name(), request_id);
                ProviderError::Timeout { status: None }
            } else if e.is_connect() {
                error!(
                    "Connection error for {} [request_id: {}]: {}",
                    provider.name(),
                    request_id,
                    detail
                );
                ProviderError::Network(format!(
                    "Connection failed: {} [request_id: {}]",
                    detail, request_id
                ))
            } else {
                error!(
                    "Request error for {} [request_id: {}]: {}",
                    provider.name(),
                    request_id,
                    detail
                );
                ProviderError::Network(format!("{} [request_id: {}]", detail, request_id))
            }
        })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response
                .text()
                .await
                .ok()
                .map(|text| scrub_secret(&text, api_key));

            warn!(
                "Request failed with status {} for {} [request_id: {}]",
                status,
                provider.name(),
                request_id
            );

            return Err(map_http_error(status, Some(&headers), body, request_id));
        }

        Self::validate_content_type(&response)?;
        self.check_content_length(&response)?;

        let response_text = response.text().await.map_err(|e| {
            ProviderError::Network(format!(
                "Failed to read response body: {} [request_id: {}]",
                e, request_id
            ))
        })?;

        if response_text.len() > self.max_response_size {
            return Err(ProviderError::Parse(format!(
                "Response size {} exceeds maximum {} [request_id: {}]",
                response_text.len(),
                self.max_response_size,
                request_id
            )));
        }

        let json = serde_json::from_str::<Value>(&response_text).map_err(|e| {
            error!(
                "Failed to parse response from {} [request_id: {}]: {}",
                provider.name(),
                request_id,
                e
            );
            ProviderError::Parse(format!(
                "Invalid response format: {} [request_id: {}]",
                e, request_id
            ))
        })?;

        info!(
            "Request completed for {} [request_id: {}]",
            provider.name(),
            request_id
        );

        Ok(json)
    }
}
