//! OpenAI provider implementation
//!
//! This module provides the adapter for the OpenAI chat completions API. The
//! wire types in [`types`] are reused by other OpenAI-compatible providers.

mod client;
pub mod types;

pub use client::{OpenAIProvider, DEFAULT_BASE_URL};
pub use types::{ChatCompletionRequest, ChatCompletionResponse};
