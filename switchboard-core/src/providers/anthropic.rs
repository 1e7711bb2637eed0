//! Anthropic provider implementation
//!
//! Implements the Provider trait for Anthropic's Messages API. The system
//! prompt travels in its own `system` field and the message list must
//! alternate strictly between user and assistant.

use crate::protocol::types::{ChatInput, Message, ModelSpec, ResponseMode, TokenUsage};
use crate::providers::adapter::{Completion, Provider, ProviderCapabilities, ProviderKind};
use crate::providers::error::{ProviderError, ProviderResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const API_VERSION: &str = "2023-06-01";

/// Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: &'a [Message],
    max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// Messages API response body (only the parts we read)
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,

    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Anthropic provider implementation
pub struct AnthropicProvider {
    base_url: String,
    capabilities: ProviderCapabilities,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let capabilities = ProviderCapabilities {
            supports_consecutive_same_role: false,
            observed: false,
        };

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            capabilities,
        }
    }
}

impl Provider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> &str {
        "/messages"
    }

    fn headers(&self, api_key: &str) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("x-api-key".to_string(), api_key.to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("anthropic-version".to_string(), API_VERSION.to_string());
        headers
    }

    // No native JSON mode: both modes send the same body and the parser
    // deals with whatever comes back.
    fn build_body(
        &self,
        model: &ModelSpec,
        _mode: ResponseMode,
        chat: &ChatInput,
        messages: &[Message],
        max_tokens: u32,
    ) -> ProviderResult<Value> {
        let request = MessagesRequest {
            model: &model.model_name,
            system: &chat.system_prompt,
            messages,
            max_tokens,
            temperature: model.temperature,
        };
        Ok(serde_json::to_value(request)?)
    }

    fn parse_response(&self, body: Value) -> ProviderResult<Completion> {
        let response: MessagesResponse = serde_json::from_value(body)?;

        let text = response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(Completion {
            text,
            usage: response.usage,
        })
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}
