//! Groq provider implementation
//!
//! Groq serves an OpenAI-compatible chat completions API, so the wire types
//! come from the OpenAI module. Differences: no `n` parameter, and JSON mode
//! always asks for a plain `json_object`.

use crate::protocol::types::{ChatInput, Message, ModelSpec, ResponseMode};
use crate::providers::adapter::{Completion, Provider, ProviderCapabilities, ProviderKind};
use crate::providers::error::ProviderResult;
use crate::providers::openai::types::{extract_completion, json_object_format, ChatCompletionRequest};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqProvider {
    base_url: String,
    capabilities: ProviderCapabilities,
}

impl GroqProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let capabilities = ProviderCapabilities {
            supports_consecutive_same_role: true,
            observed: true,
        };

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            capabilities,
        }
    }
}

impl Provider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> &str {
        "/chat/completions"
    }

    fn headers(&self, api_key: &str) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", api_key));
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn build_body(
        &self,
        model: &ModelSpec,
        mode: ResponseMode,
        _chat: &ChatInput,
        messages: &[Message],
        max_tokens: u32,
    ) -> ProviderResult<Value> {
        let request = ChatCompletionRequest {
            model: &model.model_name,
            messages,
            temperature: model.temperature,
            n: None,
            max_tokens,
            response_format: (mode == ResponseMode::Json).then(json_object_format),
        };
        Ok(serde_json::to_value(request)?)
    }

    fn parse_response(&self, body: Value) -> ProviderResult<Completion> {
        extract_completion(body)
    }
}

impl Default for GroqProvider {
    fn default() -> Self {
        Self::new()
    }
}
