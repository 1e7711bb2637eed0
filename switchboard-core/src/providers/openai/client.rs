//! OpenAI provider implementation

use super::types::{extract_completion, json_object_format, ChatCompletionRequest};
use crate::protocol::types::{ChatInput, Message, ModelSpec, ResponseMode};
use crate::providers::adapter::{Completion, Provider, ProviderCapabilities, ProviderKind};
use crate::providers::error::ProviderResult;
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider implementation
pub struct OpenAIProvider {
    base_url: String,
    capabilities: ProviderCapabilities,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
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

impl Provider for OpenAIProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
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
        let response_format = match mode {
            ResponseMode::Text => None,
            ResponseMode::Json => Some(
                model
                    .response_format
                    .clone()
                    .unwrap_or_else(json_object_format),
            ),
        };

        let request = ChatCompletionRequest {
            model: &model.model_name,
            messages,
            temperature: model.temperature,
            n: Some(1),
            max_tokens,
            response_format,
        };
        Ok(serde_json::to_value(request)?)
    }

    fn parse_response(&self, body: Value) -> ProviderResult<Completion> {
        extract_completion(body)
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_for(model: &ModelSpec, mode: ResponseMode) -> Value {
        let messages = vec![Message::system("sys"), Message::user("hi")];
        OpenAIProvider::new()
            .build_body(model, mode, &ChatInput::new("sys", "hi"), &messages, 256)
            .unwrap()
    }

    #[test]
    fn test_text_body() {
        let body = body_for(&ModelSpec::new("openai", "gpt-4o"), ResponseMode::Text);
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ],
                "n": 1,
                "max_tokens": 256
            })
        );
    }

    #[test]
    fn test_json_body_defaults_to_json_object() {
        let body = body_for(&ModelSpec::new("openai", "gpt-4o"), ResponseMode::Json);
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
    }

    #[test]
    fn test_json_body_uses_override() {
        let mut model = ModelSpec::new("openai", "gpt-4o");
        model.response_format = Some(json!({"type": "json_schema", "json_schema": {"name": "x"}}));
        let body = body_for(&model, ResponseMode::Json);
        assert_eq!(body["response_format"]["type"], "json_schema");
    }

    #[test]
    fn test_bearer_header() {
        let headers = OpenAIProvider::new().headers("sk-test");
        assert_eq!(headers["Authorization"], "Bearer sk-test");
    }
}
