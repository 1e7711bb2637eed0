//! Call observation hook
//!
//! Providers flagged as observed report each successful call to a
//! [`CallObserver`]. Observers see a summary of the call after the result is
//! built and cannot change it.

use crate::protocol::types::{CallRequest, CostBreakdown, TokenUsage};
use crate::providers::adapter::ProviderKind;
use serde::Serialize;
use tracing::info;

/// Summary of one successful provider call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallEvent {
    pub call_id: String,
    pub provider: ProviderKind,
    /// The request's `callType`
    pub generation_name: String,
    pub model: String,
    /// Attributed user; the request's `billingID`
    pub user_id: String,
    /// The request's `conversationID`
    pub session_id: String,
    pub billing_id: String,
    /// `origin.userID` when the caller set one
    pub origin_user_id: Option<String>,
    pub usage: TokenUsage,
    pub costs: CostBreakdown,
    pub attempts: u32,
}

impl CallEvent {
    pub fn from_call(
        request: &CallRequest,
        provider: ProviderKind,
        usage: TokenUsage,
        costs: CostBreakdown,
        attempts: u32,
    ) -> Self {
        Self {
            call_id: request.call_id.clone(),
            provider,
            generation_name: request.model.call_type.clone(),
            model: request.model.model_name.clone(),
            user_id: request.origin.billing_id.clone(),
            session_id: request.origin.conversation_id.clone(),
            billing_id: request.origin.billing_id.clone(),
            origin_user_id: request.origin.user_id.clone(),
            usage,
            costs,
            attempts,
        }
    }
}

/// Receives successful-call events
pub trait CallObserver: Send + Sync {
    fn on_success(&self, event: &CallEvent);
}

/// Emits each event as a structured `tracing` record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn on_success(&self, event: &CallEvent) {
        info!(
            target: "switchboard::observe",
            call_id = %event.call_id,
            provider = %event.provider,
            generation = %event.generation_name,
            model = %event.model,
            user_id = %event.user_id,
            session_id = %event.session_id,
            input_tokens = event.usage.input_tokens,
            output_tokens = event.usage.output_tokens,
            cost = event.costs.total,
            attempts = event.attempts,
            "generation recorded"
        );
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CallObserver for NoopObserver {
    fn on_success(&self, _event: &CallEvent) {}
}
