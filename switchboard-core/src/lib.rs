//! Switchboard Core Library
//!
//! A multi-provider gateway for LLM chat completions. Callers describe a call
//! once (model, prompts, history, context, billing origin) and get back a
//! uniform result with text or parsed JSON, token counts and cost, whichever
//! provider served it.
//!
//! ```no_run
//! use switchboard_core::protocol::{CallRequest, ChatInput, ModelSpec, Origin, ResponseMode};
//! use switchboard_core::Gateway;
//!
//! # async fn run() -> Result<(), switchboard_core::GatewayError> {
//! let gateway = Gateway::from_env()?;
//! let request = CallRequest::new(
//!     ModelSpec::new("groq", "llama-3.1-8b-instant").with_response_mode(ResponseMode::Json),
//!     ChatInput::new("Reply with a JSON status object.", "Are you done?"),
//!     Origin::default(),
//! );
//! let result = gateway.invoke(&request).await;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod observe;
pub mod pricing;
pub mod protocol;
pub mod providers;
pub mod session;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use pricing::{calculate_cost, PriceTable, PricingError, Rate};
pub use protocol::{CallRequest, CallResult};
pub use providers::{ProviderKind, RetryPolicy};

use tracing::error;

/// Dispatch one call with a gateway built from the environment.
///
/// Configuration problems become an error result like any other failure.
/// Long-lived callers should build a [`Gateway`] once and reuse it.
pub async fn invoke(request: &CallRequest) -> CallResult {
    match Gateway::from_env() {
        Ok(gateway) => gateway.invoke(request).await,
        Err(err) => {
            error!(call_id = %request.call_id, "Gateway configuration failed: {}", err);
            CallResult::error(err)
        }
    }
}

/// Returns the version of the Switchboard Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
