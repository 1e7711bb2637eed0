//! Protocol module for gateway request/response structures
//!
//! This module defines the caller-facing data model. These structures are:
//! - Provider-agnostic
//! - Wire-compatible with the call-details JSON existing agents produce
//! - Immutable once handed to the gateway

pub mod types;

pub use types::{
    CallRequest, CallResult, CallUsage, ChatInput, ContextPassage, CostBreakdown, ErrorMarker,
    Message, MessageContext, MessageRole, ModelSpec, Origin, ResponseMode, TokenUsage,
    UsageStats, ERROR_SENTINEL,
};
