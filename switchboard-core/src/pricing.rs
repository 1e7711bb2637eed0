//! Cost calculation from token usage
//!
//! Rates are dollars per million tokens, per direction. A provider missing
//! from the table is a configuration gap and is reported as an error rather
//! than costed at zero.

use crate::protocol::types::{CostBreakdown, TokenUsage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const TOKENS_PER_UNIT: f64 = 1_000_000.0;

/// Errors raised by price lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Unknown provider for pricing: {0}")]
    UnknownProvider(String),
}

/// Price of one provider's tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rate {
    Metered {
        input_per_million: f64,
        output_per_million: f64,
    },
    Free,
}

impl Rate {
    pub fn metered(input_per_million: f64, output_per_million: f64) -> Self {
        Rate::Metered {
            input_per_million,
            output_per_million,
        }
    }

    /// Cost of `usage` at this rate
    pub fn cost(&self, usage: &TokenUsage) -> CostBreakdown {
        match self {
            Rate::Free => CostBreakdown::zero(),
            Rate::Metered {
                input_per_million,
                output_per_million,
            } => {
                let input = (usage.input_tokens as f64 / TOKENS_PER_UNIT) * input_per_million;
                let output = (usage.output_tokens as f64 / TOKENS_PER_UNIT) * output_per_million;
                CostBreakdown {
                    input,
                    output,
                    total: input + output,
                }
            }
        }
    }
}

/// Provider name → rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Rate>",
    into = "BTreeMap<String, Rate>"
)]
pub struct PriceTable {
    rates: BTreeMap<String, Rate>,
}

impl From<BTreeMap<String, Rate>> for PriceTable {
    fn from(rates: BTreeMap<String, Rate>) -> Self {
        rates
            .into_iter()
            .fold(Self::empty(), |table, (name, rate)| table.with_rate(name, rate))
    }
}

impl From<PriceTable> for BTreeMap<String, Rate> {
    fn from(table: PriceTable) -> Self {
        table.rates
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::empty()
            .with_rate("anthropic", Rate::metered(3.0, 15.0))
            .with_rate("openai", Rate::metered(5.0, 15.0))
            .with_rate("groq", Rate::Free)
    }
}

impl PriceTable {
    pub fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, provider: impl AsRef<str>, rate: Rate) -> Self {
        self.rates
            .insert(provider.as_ref().to_ascii_lowercase(), rate);
        self
    }

    pub fn rate(&self, provider: &str) -> Option<&Rate> {
        self.rates.get(&provider.to_ascii_lowercase())
    }

    pub fn rates(&self) -> impl Iterator<Item = (&str, &Rate)> {
        self.rates.iter().map(|(name, rate)| (name.as_str(), rate))
    }

    /// Cost of `usage` for `provider`
    pub fn cost(&self, provider: &str, usage: &TokenUsage) -> Result<CostBreakdown, PricingError> {
        self.rate(provider)
            .map(|rate| rate.cost(usage))
            .ok_or_else(|| PricingError::UnknownProvider(provider.to_string()))
    }
}

/// Cost with the built-in price table
pub fn calculate_cost(provider: &str, usage: &TokenUsage) -> Result<CostBreakdown, PricingError> {
    PriceTable::default().cost(provider, usage)
}
