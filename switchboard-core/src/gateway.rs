//! Gateway dispatcher
//!
//! [`Gateway::invoke`] is the single entry point. It resolves the adapter for
//! a request, runs it, reports the call to the observer and turns every
//! failure into the uniform error result. Nothing it holds is mutated after
//! construction, so one gateway can serve any number of concurrent calls.

use crate::config::{ConfigValidator, GatewayConfig, SafeLogging, SecretString};
use crate::error::GatewayError;
use crate::http::client::HttpClient;
use crate::http::error::scrub_secret;
use crate::http::HttpExecutor;
use crate::observe::{CallEvent, CallObserver, TracingObserver};
use crate::pricing::PriceTable;
use crate::protocol::types::{CallRequest, CallResult};
use crate::providers::adapter::{Adapter, AdapterContext, AdapterKey, Provider, ProviderKind};
use crate::providers::error::ProviderError;
use crate::providers::retry::RetryPolicy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// A configured, enabled provider
struct ProviderSlot {
    provider: Arc<dyn Provider>,
    api_key: SecretString,
    retry: RetryPolicy,
}

/// Multi-provider dispatcher
#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    http: Arc<dyn HttpExecutor>,
    providers: Arc<HashMap<ProviderKind, ProviderSlot>>,
    pricing: Arc<PriceTable>,
    observer: Arc<dyn CallObserver>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut providers: Vec<_> = self.providers.keys().collect();
        providers.sort();
        f.debug_struct("Gateway")
            .field("providers", &providers)
            .field("pricing", &self.pricing)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Build a gateway from a validated configuration
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        ConfigValidator::new()
            .validate(&config)
            .map_err(crate::config::ConfigError::from)?;

        let http = HttpClient::with_config(&config.connection)?;

        let providers = config
            .providers
            .iter()
            .filter(|settings| settings.enabled)
            .map(|settings| {
                debug!("Registering provider {}", settings.safe_for_logging());
                let slot = ProviderSlot {
                    provider: settings
                        .provider_type
                        .create_provider(settings.base_url.as_deref()),
                    api_key: settings.api_key.clone(),
                    retry: settings.effective_retry_policy(),
                };
                (settings.provider_type, slot)
            })
            .collect::<HashMap<_, _>>();

        Ok(Self {
            pricing: Arc::new(config.pricing.clone()),
            config: Arc::new(config),
            http: Arc::new(http),
            providers: Arc::new(providers),
            observer: Arc::new(TracingObserver),
        })
    }

    /// Build a gateway from provider keys in the environment
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_pricing(mut self, pricing: PriceTable) -> Self {
        self.pricing = Arc::new(pricing);
        self
    }

    /// Replace the HTTP executor
    pub fn with_http(mut self, http: Arc<dyn HttpExecutor>) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Providers that have credentials configured
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Dispatch one call. Never fails: every fault becomes the error result.
    pub async fn invoke(&self, request: &CallRequest) -> CallResult {
        info!(
            call_id = %request.call_id,
            provider = %request.model.provider,
            model = %request.model.model_name,
            "Dispatching call"
        );

        match self.dispatch(request).await {
            Ok(result) => result,
            Err(err) => {
                let diagnostic = self.scrub(&err.to_string());
                match &err {
                    GatewayError::Pricing(_) => error!(
                        call_id = %request.call_id,
                        "Pricing table gap, call result discarded: {}",
                        diagnostic
                    ),
                    _ => error!(call_id = %request.call_id, "Call failed: {}", diagnostic),
                }
                CallResult::error(diagnostic)
            }
        }
    }

    async fn dispatch(&self, request: &CallRequest) -> Result<CallResult, GatewayError> {
        let key = AdapterKey::for_request(request)?;
        let adapter = Adapter::select(key);
        debug!(call_id = %request.call_id, ?adapter, "Selected adapter");

        let slot = self
            .providers
            .get(&key.provider)
            .ok_or_else(|| ProviderError::MissingApiKey(key.provider.to_string()))?;

        let ctx = AdapterContext {
            http: self.http.as_ref(),
            provider: slot.provider.as_ref(),
            api_key: slot.api_key.expose_secret(),
            retry: &slot.retry,
            pricing: &self.pricing,
            default_max_tokens: self.config.defaults.max_tokens,
            request_timeout: Duration::from_millis(self.config.connection.request_timeout_ms),
        };

        let dispatch = adapter.invoke(&ctx, request).await?;

        if slot.provider.capabilities().observed {
            if let Some(stats) = dispatch.result.usage_stats() {
                let event = CallEvent::from_call(
                    request,
                    key.provider,
                    dispatch.usage,
                    stats.costs,
                    dispatch.attempts,
                );
                self.observer.on_success(&event);
            }
        }

        Ok(dispatch.result)
    }

    /// Strip every configured API key from `text`
    fn scrub(&self, text: &str) -> String {
        self.providers.values().fold(text.to_string(), |acc, slot| {
            scrub_secret(&acc, slot.api_key.expose_secret())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;
    use crate::protocol::types::{ChatInput, ModelSpec, Origin};

    fn request(provider: &str) -> CallRequest {
        CallRequest::with_call_id(
            "call-1",
            ModelSpec::new(provider, "some-model"),
            ChatInput::new("sys", "Hello"),
            Origin::default(),
        )
    }

    fn gateway() -> Gateway {
        let config = GatewayConfig::default()
            .with_provider(ProviderSettings::new(ProviderKind::Groq, "gsk_secret_value"));
        Gateway::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_provider_is_error_result() {
        let result = gateway().invoke(&request("mistral")).await;
        assert!(result.is_error());
        assert_eq!(
            result.text(),
            Some("An error occurred: Unsupported provider: mistral")
        );
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_error_result() {
        let result = gateway().invoke(&request("openai")).await;
        assert!(result.is_error());
        assert_eq!(
            result.text(),
            Some("An error occurred: Missing API key for provider: openai")
        );
    }

    #[test]
    fn test_scrub_removes_keys() {
        let gw = gateway();
        assert_eq!(gw.scrub("bad key gsk_secret_value"), "bad key [REDACTED]");
        assert!(!format!("{:?}", gw).contains("gsk_secret_value"));
    }

    #[test]
    fn test_gateway_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Gateway>();
    }
}
