//! OpenAI chat completions wire types
//!
//! Shared by every OpenAI-compatible provider (OpenAI itself and Groq).

use crate::protocol::types::{Message, TokenUsage};
use crate::providers::adapter::Completion;
use crate::providers::error::{ProviderError, ProviderResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// OpenAI choice
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// The `{"type":"json_object"}` response format
pub fn json_object_format() -> Value {
    serde_json::json!({ "type": "json_object" })
}

/// First choice's content, trimmed, plus token usage
pub fn extract_completion(body: Value) -> ProviderResult<Completion> {
    let response: ChatCompletionResponse = serde_json::from_value(body)?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ProviderError::EmptyResponse)?;

    Ok(Completion {
        text: text.trim().to_string(),
        usage: response.usage.unwrap_or_default(),
    })
}
