//! Provider abstraction layer
//!
//! Everything between a normalized call and an upstream vendor API: message
//! layout per provider family, the per-vendor wire formats, retries and
//! structured-output recovery.

pub mod adapter;
pub mod anthropic;
pub mod error;
pub mod groq;
pub mod normalize;
pub mod openai;
pub mod parse;
pub mod retry;

pub use adapter::{
    Adapter, AdapterContext, AdapterKey, Completion, Dispatch, Provider, ProviderCapabilities,
    ProviderKind,
};
pub use error::{ProviderError, ProviderResult};
pub use normalize::NormalizeStrategy;
pub use parse::{parse_structured, Parsed};
pub use retry::{Backoff, RetryExecutor, RetryOutcome, RetryPolicy};

// Re-export concrete providers
pub use anthropic::AnthropicProvider;
pub use groq::GroqProvider;
pub use openai::OpenAIProvider;
