//! Gateway-level error type
//!
//! Nothing here crosses the public `invoke` boundary: the dispatcher turns
//! every [`GatewayError`] into the uniform error result.

use crate::config::ConfigError;
use crate::pricing::PricingError;
use crate::providers::error::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// `model.provider` names a provider the gateway does not know
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The price table has no entry for a provider that was just called
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
