//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use super::secrets::{SafeLogging, SecretString};
use crate::pricing::PriceTable;
use crate::providers::adapter::ProviderKind;
use crate::providers::retry::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};

pub const SUPPORTED_VERSION: &str = "0.1";

/// Upper bound on configured attempts per call
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Root configuration structure for the gateway
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Upstream providers and their credentials
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,

    /// Global connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Global defaults
    #[serde(default)]
    pub defaults: DefaultConfig,

    /// Per-provider token prices
    #[serde(default)]
    pub pricing: PriceTable,
}

/// One upstream provider
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    #[serde(rename = "type")]
    pub provider_type: ProviderKind,

    /// API key (supports environment variable interpolation)
    pub api_key: SecretString,

    /// Overrides the vendor's public endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Overrides the provider's default retry policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,

    /// Whether this provider is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Maximum idle connections per host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_idle_per_host: default_max_idle(),
        }
    }
}

/// Default configuration values
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultConfig {
    /// Max output tokens when a request does not set its own
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool { true }
fn default_connect_timeout() -> u64 { 10_000 }
fn default_request_timeout() -> u64 { 60_000 }
fn default_max_idle() -> usize { 10 }
fn default_max_tokens() -> u32 { 4096 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION.to_string(),
            providers: Vec::new(),
            connection: ConnectionConfig::default(),
            defaults: DefaultConfig::default(),
            pricing: PriceTable::default(),
        }
    }
}

impl GatewayConfig {
    pub fn with_provider(mut self, settings: ProviderSettings) -> Self {
        self.providers.push(settings);
        self
    }

    pub fn with_pricing(mut self, pricing: PriceTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Enabled settings for `kind`, if any
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderSettings> {
        self.providers
            .iter()
            .find(|p| p.enabled && p.provider_type == kind)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::required("version"));
        }

        if self.version != SUPPORTED_VERSION {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::InvalidVersion {
                    expected: SUPPORTED_VERSION.to_string(),
                    actual: self.version.clone(),
                },
            ));
        }

        // One entry per provider type
        let mut seen = std::collections::HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if !seen.insert(provider.provider_type) {
                return Err(ValidationError::new(
                    format!("providers[{}].type", i),
                    ValidationErrorKind::DuplicateValue {
                        value: provider.provider_type.to_string(),
                    },
                ));
            }

            provider.validate(&format!("providers[{}]", i))?;
        }

        if self.defaults.max_tokens == 0 {
            return Err(ValidationError::out_of_range(
                "defaults.max_tokens",
                "Must be greater than 0",
            ));
        }

        if self.connection.request_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                "connection.request_timeout_ms",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl ProviderSettings {
    pub fn new(provider_type: ProviderKind, api_key: impl Into<SecretString>) -> Self {
        Self {
            provider_type,
            api_key: api_key.into(),
            base_url: None,
            retry_policy: None,
            enabled: true,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Explicit policy, or the provider's default: Groq retries transient
    /// failures, the others make a single attempt
    pub fn effective_retry_policy(&self) -> RetryPolicy {
        self.retry_policy
            .clone()
            .unwrap_or_else(|| default_retry_policy(self.provider_type))
    }

    /// Validate provider configuration
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.enabled && self.api_key.is_empty() {
            return Err(ValidationError::required(format!("{}.api_key", path)));
        }

        if let Some(base_url) = &self.base_url {
            match url::Url::parse(base_url) {
                Ok(url) => {
                    if url.scheme() != "http" && url.scheme() != "https" {
                        return Err(ValidationError::new(
                            format!("{}.base_url", path),
                            ValidationErrorKind::InvalidUrl {
                                message: format!(
                                    "URL scheme must be http or https, got: {}",
                                    url.scheme()
                                ),
                            },
                        ));
                    }
                }
                Err(e) => {
                    return Err(ValidationError::new(
                        format!("{}.base_url", path),
                        ValidationErrorKind::InvalidUrl {
                            message: e.to_string(),
                        },
                    ));
                }
            }
        }

        if let Some(retry) = &self.retry_policy {
            validate_retry_policy(retry, &format!("{}.retry_policy", path))?;
        }

        Ok(())
    }
}

impl SafeLogging for ProviderSettings {
    fn safe_for_logging(&self) -> String {
        format!(
            "{} (key: {}, base_url: {}, enabled: {})",
            self.provider_type,
            self.api_key.partial_redact(),
            self.base_url.as_deref().unwrap_or("default"),
            self.enabled
        )
    }
}

/// Retry policy a provider gets when its settings do not name one
pub fn default_retry_policy(kind: ProviderKind) -> RetryPolicy {
    match kind {
        ProviderKind::Groq => RetryPolicy::default(),
        ProviderKind::Anthropic | ProviderKind::OpenAI => RetryPolicy::no_retry(),
    }
}

/// Validate retry policy bounds
pub fn validate_retry_policy(policy: &RetryPolicy, path: &str) -> Result<(), ValidationError> {
    if policy.max_attempts == 0 || policy.max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(ValidationError::out_of_range(
            format!("{}.max_attempts", path),
            format!("Must be between 1 and {}", MAX_ATTEMPTS_LIMIT),
        ));
    }

    if !(0.0..=1.0).contains(&policy.jitter_factor) {
        return Err(ValidationError::out_of_range(
            format!("{}.jitter_factor", path),
            "Must be between 0.0 and 1.0",
        ));
    }

    if let Backoff::Exponential {
        initial_ms,
        base,
        max_ms,
    } = policy.backoff
    {
        if base < 1.0 {
            return Err(ValidationError::out_of_range(
                format!("{}.backoff.base", path),
                "Must be at least 1.0",
            ));
        }

        if max_ms < initial_ms {
            return Err(ValidationError::new(
                format!("{}.backoff.max_ms", path),
                ValidationErrorKind::Incompatible {
                    message: "Must be >= initial_ms".to_string(),
                },
            ));
        }
    }

    Ok(())
}
