//! Core protocol types for gateway calls
//!
//! These are the caller-facing structures. Field names on the wire follow the
//! call-details format used by existing agents (`callID`, `messageHistory`,
//! `billingID`, ...) so a JSON request built elsewhere deserializes directly.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Sentinel used for `callID`, `billingID` and `usage` on failed calls
pub const ERROR_SENTINEL: &str = "error";

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

impl MessageRole {
    /// The turn that must follow this one under strict alternation
    pub fn opposite(self) -> Self {
        match self {
            MessageRole::User => MessageRole::Assistant,
            MessageRole::Assistant | MessageRole::System => MessageRole::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single conversation message, used both for history and for normalized output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Whether the caller expects free text or a structured JSON object back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseMode {
    #[default]
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json", alias = "json_object")]
    Json,
}

/// Model selection and sampling settings for a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Provider name (`anthropic`, `openai`, `groq`), matched case-insensitively
    pub provider: String,

    /// Upstream model identifier
    #[serde(rename = "model", alias = "modelName")]
    pub model_name: String,

    #[serde(rename = "responseMode", alias = "type", default)]
    pub response_mode: ResponseMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(
        rename = "max_tokens",
        alias = "maxTokens",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_tokens: Option<u32>,

    /// Free-text label used for observability only
    #[serde(rename = "callType", default)]
    pub call_type: String,

    /// Raw `response_format` override for OpenAI JSON calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

impl ModelSpec {
    pub fn new(provider: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_name: model_name.into(),
            response_mode: ResponseMode::Text,
            temperature: None,
            max_tokens: None,
            call_type: String::new(),
            response_format: None,
        }
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_call_type(mut self, call_type: impl Into<String>) -> Self {
        self.call_type = call_type.into();
        self
    }
}

/// Supplementary retrieved text, kept apart from the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContext {
    Text(String),
    Passages(Vec<String>),
}

impl Default for MessageContext {
    fn default() -> Self {
        MessageContext::Text(String::new())
    }
}

impl MessageContext {
    /// Maximum characters kept from a single retrieved passage
    pub const PASSAGE_LIMIT: usize = 2000;

    /// Flatten into the single text block that gets submitted
    pub fn render(&self) -> String {
        match self {
            MessageContext::Text(text) => text.clone(),
            MessageContext::Passages(parts) => parts
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContext::Text(text) => text.is_empty(),
            MessageContext::Passages(parts) => parts.iter().all(|p| p.is_empty()),
        }
    }

    /// Build a context block from knowledge-base passages.
    ///
    /// Each passage is labelled with its position, title and source, and its
    /// text is cut to [`MessageContext::PASSAGE_LIMIT`] characters.
    pub fn from_passages(passages: &[ContextPassage]) -> Self {
        let mut context = String::from(
            "Context retrieved from your knowledge base is, please use this as reference when answering questions:\n",
        );
        for (index, passage) in passages.iter().enumerate() {
            let text: String = passage.text.chars().take(Self::PASSAGE_LIMIT).collect();
            context.push_str(&format!("Context: {}:\n", index + 1));
            context.push_str(&format!("Source: {}-{}\n", passage.title, passage.source));
            context.push_str(&format!("Content: {}...\n\n", text));
        }
        MessageContext::Text(context)
    }
}

impl From<&str> for MessageContext {
    fn from(text: &str) -> Self {
        MessageContext::Text(text.to_string())
    }
}

impl From<String> for MessageContext {
    fn from(text: String) -> Self {
        MessageContext::Text(text)
    }
}

impl From<Vec<String>> for MessageContext {
    fn from(parts: Vec<String>) -> Self {
        MessageContext::Passages(parts)
    }
}

/// A passage returned by a retrieval step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPassage {
    pub title: String,
    pub source: String,
    pub text: String,
}

/// Prompt material for one conversational turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInput {
    #[serde(rename = "systemPrompt", default, deserialize_with = "null_as_default")]
    pub system_prompt: String,

    #[serde(rename = "userPrompt", default, deserialize_with = "null_as_default")]
    pub user_prompt: String,

    #[serde(rename = "messageHistory", default, deserialize_with = "null_as_default")]
    pub message_history: Vec<Message>,

    #[serde(rename = "messageContext", default, deserialize_with = "null_as_default")]
    pub message_context: MessageContext,
}

/// Callers send `null` for prompt fields they have nothing for
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatInput {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.message_history = history;
        self
    }

    pub fn with_context(mut self, context: impl Into<MessageContext>) -> Self {
        self.message_context = context.into();
        self
    }
}

/// Billing attribution, carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(rename = "productID", default)]
    pub product_id: String,

    #[serde(rename = "customerID", default)]
    pub customer_id: String,

    #[serde(rename = "channelID", default)]
    pub channel_id: String,

    #[serde(rename = "conversationID", default)]
    pub conversation_id: String,

    #[serde(rename = "billingID", default)]
    pub billing_id: String,

    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A single gateway invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    #[serde(rename = "callID")]
    pub call_id: String,
    pub model: ModelSpec,
    pub chat: ChatInput,
    pub origin: Origin,
}

impl CallRequest {
    /// Build a request with a freshly generated call id
    pub fn new(model: ModelSpec, chat: ChatInput, origin: Origin) -> Self {
        Self::with_call_id(Uuid::new_v4().to_string(), model, chat, origin)
    }

    pub fn with_call_id(
        call_id: impl Into<String>,
        model: ModelSpec,
        chat: ChatInput,
        origin: Origin,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            model,
            chat,
            origin,
        }
    }
}

/// Token counters as reported by a provider.
///
/// Anthropic reports `input_tokens`/`output_tokens`, OpenAI-style APIs report
/// `prompt_tokens`/`completion_tokens`; both spellings land in the same fields.
/// When a reply carries both, the Anthropic names win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReportedUsage")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Usage object as it arrives on the wire, under either naming
#[derive(Deserialize)]
struct ReportedUsage {
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

impl From<ReportedUsage> for TokenUsage {
    fn from(raw: ReportedUsage) -> Self {
        Self {
            input_tokens: raw.input_tokens.or(raw.prompt_tokens).unwrap_or(0),
            output_tokens: raw.output_tokens.or(raw.completion_tokens).unwrap_or(0),
        }
    }
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// Dollar cost of a call, split by direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub input: f64,
    pub output: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Usage and cost attached to a successful result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(rename = "modelName")]
    pub model_name: String,

    #[serde(rename = "inputTokenCount")]
    pub input_token_count: u64,

    #[serde(rename = "outputTokenCount")]
    pub output_token_count: u64,

    pub costs: CostBreakdown,
}

/// Marker serialized as the string `"error"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorMarker {
    #[serde(rename = "error")]
    Error,
}

/// `usage` field of a result: real stats, or the `"error"` sentinel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallUsage {
    Stats(UsageStats),
    Failed(ErrorMarker),
}

/// Uniform result of every gateway invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    #[serde(rename = "callID")]
    pub call_id: String,

    #[serde(rename = "billingID")]
    pub billing_id: String,

    /// Primary text, or the parsed JSON value for structured calls
    pub message: Value,

    pub usage: CallUsage,
}

impl CallResult {
    pub fn success(request: &CallRequest, message: Value, usage: UsageStats) -> Self {
        Self {
            call_id: request.call_id.clone(),
            billing_id: request.origin.billing_id.clone(),
            message,
            usage: CallUsage::Stats(usage),
        }
    }

    /// The sentinel failure shape; `diagnostic` becomes the message
    pub fn error(diagnostic: impl std::fmt::Display) -> Self {
        Self {
            call_id: ERROR_SENTINEL.to_string(),
            billing_id: ERROR_SENTINEL.to_string(),
            message: Value::String(format!("An error occurred: {}", diagnostic)),
            usage: CallUsage::Failed(ErrorMarker::Error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.call_id == ERROR_SENTINEL
    }

    /// Message as text when the provider returned (or fell back to) a string
    pub fn text(&self) -> Option<&str> {
        self.message.as_str()
    }

    pub fn usage_stats(&self) -> Option<&UsageStats> {
        match &self.usage {
            CallUsage::Stats(stats) => Some(stats),
            CallUsage::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_request_from_agent_json() {
        let raw = json!({
            "callID": "c-1",
            "model": {
                "provider": "groq",
                "model": "llama-3.1-8b-instant",
                "type": "json_object",
                "temperature": 0.8,
                "callType": "status check"
            },
            "chat": {
                "systemPrompt": "sys",
                "userPrompt": "hi",
                "messageHistory": [{"role": "user", "content": "earlier"}],
                "messageContext": ["a", "b"]
            },
            "origin": {
                "productID": "tldr",
                "customerID": "cust",
                "channelID": "chan",
                "conversationID": "conv",
                "billingID": "bill"
            }
        });

        let request: CallRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(request.call_id, "c-1");
        assert_eq!(request.model.response_mode, ResponseMode::Json);
        assert_eq!(request.model.max_tokens, None);
        assert_eq!(request.chat.message_history.len(), 1);
        assert_eq!(request.chat.message_context.render(), "a\n\nb");
        assert_eq!(request.origin.billing_id, "bill");
    }

    #[test]
    fn test_error_result_serializes_sentinels() {
        let result = CallResult::error("boom");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "callID": "error",
                "billingID": "error",
                "message": "An error occurred: boom",
                "usage": "error"
            })
        );
        assert!(result.is_error());

        let back: CallResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.usage, CallUsage::Failed(ErrorMarker::Error));
    }

    #[test]
    fn test_token_usage_accepts_both_namings() {
        let anthropic: TokenUsage =
            serde_json::from_value(json!({"input_tokens": 10, "output_tokens": 4})).unwrap();
        let openai: TokenUsage = serde_json::from_value(
            json!({"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}),
        )
        .unwrap();
        assert_eq!(anthropic, openai);
    }

    #[test]
    fn test_token_usage_with_both_namings() {
        let usage: TokenUsage = serde_json::from_value(json!({
            "input_tokens": 5,
            "prompt_tokens": 7,
            "output_tokens": 2,
            "completion_tokens": 3
        }))
        .unwrap();
        assert_eq!(usage, TokenUsage::new(5, 2));

        let partial: TokenUsage =
            serde_json::from_value(json!({"prompt_tokens": 9, "output_tokens": 1})).unwrap();
        assert_eq!(partial, TokenUsage::new(9, 1));

        let empty: TokenUsage = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, TokenUsage::default());
    }

    #[test]
    fn test_context_from_passages_truncates() {
        let long = "x".repeat(2500);
        let context = MessageContext::from_passages(&[ContextPassage {
            title: "Manual".to_string(),
            source: "site".to_string(),
            text: long,
        }]);
        let rendered = context.render();
        assert!(rendered.contains("Context: 1:\nSource: Manual-site\n"));
        assert!(rendered.contains(&format!("Content: {}...", "x".repeat(2000))));
        assert!(!rendered.contains(&"x".repeat(2001)));
    }
}
