//! Provider adapter trait, provider kinds and adapter selection
//!
//! A [`Provider`] knows one vendor's wire format: where to POST, which headers
//! to send, how to lay out the body and where the text and token counts live
//! in the reply. An [`Adapter`] is one (provider, response mode) pair and runs
//! the full call: normalize, send with retries, extract, parse, cost.

use crate::error::GatewayError;
use crate::http::{HttpExecutor, RequestOptions};
use crate::pricing::PriceTable;
use crate::protocol::types::{
    CallRequest, CallResult, ChatInput, Message, ModelSpec, ResponseMode, TokenUsage, UsageStats,
};
use crate::providers::error::ProviderResult;
use crate::providers::normalize::NormalizeStrategy;
use crate::providers::parse::parse_structured;
use crate::providers::retry::{RetryExecutor, RetryPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Text and token counts pulled out of a provider reply
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Core provider trait that all LLM providers must implement
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Get the provider's name
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    fn capabilities(&self) -> &ProviderCapabilities;

    /// Message layout this provider family requires
    fn strategy(&self) -> NormalizeStrategy {
        if self.capabilities().supports_consecutive_same_role {
            NormalizeStrategy::SystemPrefixed
        } else {
            NormalizeStrategy::StrictAlternation
        }
    }

    /// Get the base URL for this provider
    fn base_url(&self) -> &str;

    /// Path of the chat endpoint, appended to the base URL
    fn endpoint(&self) -> &str;

    /// Get headers required for this provider
    fn headers(&self, api_key: &str) -> HashMap<String, String>;

    /// Build the vendor request body from already-normalized messages
    fn build_body(
        &self,
        model: &ModelSpec,
        mode: ResponseMode,
        chat: &ChatInput,
        messages: &[Message],
        max_tokens: u32,
    ) -> ProviderResult<Value>;

    /// Pull the primary text and token counts out of the vendor reply
    fn parse_response(&self, body: Value) -> ProviderResult<Completion>;
}

/// Static facts about a provider that drive request shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Does the provider support multiple messages with the same role in sequence?
    pub supports_consecutive_same_role: bool,

    /// Are successful calls reported to the call observer?
    pub observed: bool,
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self {
            supports_consecutive_same_role: true,
            observed: false,
        }
    }
}

/// The closed set of upstream providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Groq,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAI,
        ProviderKind::Groq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Groq => "groq",
        }
    }

    /// Create a provider instance for this kind
    pub fn create_provider(&self, base_url: Option<&str>) -> Arc<dyn Provider> {
        use crate::providers::{AnthropicProvider, GroqProvider, OpenAIProvider};

        match (self, base_url) {
            (ProviderKind::Anthropic, Some(url)) => Arc::new(AnthropicProvider::with_base_url(url)),
            (ProviderKind::Anthropic, None) => Arc::new(AnthropicProvider::new()),
            (ProviderKind::OpenAI, Some(url)) => Arc::new(OpenAIProvider::with_base_url(url)),
            (ProviderKind::OpenAI, None) => Arc::new(OpenAIProvider::new()),
            (ProviderKind::Groq, Some(url)) => Arc::new(GroqProvider::with_base_url(url)),
            (ProviderKind::Groq, None) => Arc::new(GroqProvider::new()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAI),
            "groq" => Ok(ProviderKind::Groq),
            _ => Err(GatewayError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Lookup key for adapter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterKey {
    pub provider: ProviderKind,
    pub mode: ResponseMode,
}

impl AdapterKey {
    pub fn new(provider: ProviderKind, mode: ResponseMode) -> Self {
        Self { provider, mode }
    }

    /// Resolve the key for a request; fails on an unknown provider name
    pub fn for_request(request: &CallRequest) -> Result<Self, GatewayError> {
        let provider = request.model.provider.parse::<ProviderKind>()?;
        Ok(Self::new(provider, request.model.response_mode))
    }
}

/// One adapter per (provider, response mode) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    AnthropicText,
    AnthropicJson,
    OpenAIText,
    OpenAIJson,
    GroqText,
    GroqJson,
}

/// Everything an adapter needs to reach its provider
pub struct AdapterContext<'a> {
    pub http: &'a dyn HttpExecutor,
    pub provider: &'a dyn Provider,
    pub api_key: &'a str,
    pub retry: &'a RetryPolicy,
    pub pricing: &'a PriceTable,
    pub default_max_tokens: u32,
    pub request_timeout: Duration,
}

/// A completed adapter run
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub result: CallResult,
    pub usage: TokenUsage,
    pub attempts: u32,
}

impl Adapter {
    pub fn select(key: AdapterKey) -> Self {
        match (key.provider, key.mode) {
            (ProviderKind::Anthropic, ResponseMode::Text) => Adapter::AnthropicText,
            (ProviderKind::Anthropic, ResponseMode::Json) => Adapter::AnthropicJson,
            (ProviderKind::OpenAI, ResponseMode::Text) => Adapter::OpenAIText,
            (ProviderKind::OpenAI, ResponseMode::Json) => Adapter::OpenAIJson,
            (ProviderKind::Groq, ResponseMode::Text) => Adapter::GroqText,
            (ProviderKind::Groq, ResponseMode::Json) => Adapter::GroqJson,
        }
    }

    pub fn key(&self) -> AdapterKey {
        match self {
            Adapter::AnthropicText => AdapterKey::new(ProviderKind::Anthropic, ResponseMode::Text),
            Adapter::AnthropicJson => AdapterKey::new(ProviderKind::Anthropic, ResponseMode::Json),
            Adapter::OpenAIText => AdapterKey::new(ProviderKind::OpenAI, ResponseMode::Text),
            Adapter::OpenAIJson => AdapterKey::new(ProviderKind::OpenAI, ResponseMode::Json),
            Adapter::GroqText => AdapterKey::new(ProviderKind::Groq, ResponseMode::Text),
            Adapter::GroqJson => AdapterKey::new(ProviderKind::Groq, ResponseMode::Json),
        }
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.key().provider
    }

    pub fn mode(&self) -> ResponseMode {
        self.key().mode
    }

    /// Run the call end to end against `ctx.provider`
    pub async fn invoke(
        &self,
        ctx: &AdapterContext<'_>,
        request: &CallRequest,
    ) -> Result<Dispatch, GatewayError> {
        let provider = ctx.provider;
        let mode = self.mode();

        let messages = provider.strategy().apply(&request.chat);
        let max_tokens = request.model.max_tokens.unwrap_or(ctx.default_max_tokens);
        let body = provider.build_body(&request.model, mode, &request.chat, &messages, max_tokens)?;

        debug!(
            call_id = %request.call_id,
            adapter = ?self,
            messages = messages.len(),
            "Sending {} messages to {}",
            messages.len(),
            provider.name()
        );

        let options = RequestOptions::new(request.call_id.clone()).with_timeout(ctx.request_timeout);
        let executor = RetryExecutor::new(ctx.retry.clone());
        let (body, options) = (&body, &options);
        let outcome = executor
            .execute(move || async move {
                let reply = ctx
                    .http
                    .execute_json(provider, ctx.api_key, body, options)
                    .await?;
                provider.parse_response(reply)
            })
            .await;
        let attempts = outcome.attempts;
        let completion = outcome.into_result()?;

        let message = match mode {
            ResponseMode::Text => Value::String(completion.text),
            ResponseMode::Json => parse_structured(&completion.text).into_value(),
        };

        let costs = ctx.pricing.cost(provider.name(), &completion.usage)?;
        let usage = UsageStats {
            model_name: request.model.model_name.clone(),
            input_token_count: completion.usage.input_tokens,
            output_token_count: completion.usage.output_tokens,
            costs,
        };

        info!(
            call_id = %request.call_id,
            attempts,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "{} call completed",
            provider.name()
        );

        Ok(Dispatch {
            result: CallResult::success(request, message, usage),
            usage: completion.usage,
            attempts,
        })
    }
}
