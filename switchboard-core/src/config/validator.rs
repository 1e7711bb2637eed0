//! Configuration validation utilities

use super::env::env_var_pattern;
use super::error::ValidationError;
use super::schema::GatewayConfig;
use tracing::warn;

/// Configuration validator with additional validation rules
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &GatewayConfig) -> Result<(), ValidationError> {
        config.validate()?;

        self.validate_placeholders(config)?;
        self.validate_pricing(config)?;

        Ok(())
    }

    /// Placeholders must be gone by the time a config is validated
    fn validate_placeholders(&self, config: &GatewayConfig) -> Result<(), ValidationError> {
        for (i, provider) in config.providers.iter().enumerate() {
            if let Some(var) = self.extract_env_vars(provider.api_key.expose_secret()).first() {
                return Err(ValidationError::invalid_format(
                    format!("providers[{}].api_key", i),
                    "unresolved environment placeholder",
                )
                .with_context(format!("set {}", var)));
            }
        }

        Ok(())
    }

    /// Prices must be non-negative; a provider without a price is allowed but
    /// every call to it will fail at costing time
    fn validate_pricing(&self, config: &GatewayConfig) -> Result<(), ValidationError> {
        for (name, rate) in config.pricing.rates() {
            if let crate::pricing::Rate::Metered {
                input_per_million,
                output_per_million,
            } = rate
            {
                if *input_per_million < 0.0 || input_per_million.is_nan() {
                    return Err(ValidationError::out_of_range(
                        format!("pricing.{}.input_per_million", name),
                        "Must be non-negative",
                    ));
                }
                if *output_per_million < 0.0 || output_per_million.is_nan() {
                    return Err(ValidationError::out_of_range(
                        format!("pricing.{}.output_per_million", name),
                        "Must be non-negative",
                    ));
                }
            }
        }

        for provider in config.providers.iter().filter(|p| p.enabled) {
            if config.pricing.rate(provider.provider_type.as_str()).is_none() {
                warn!(
                    "No price configured for provider {}; its calls will return errors",
                    provider.provider_type
                );
            }
        }

        Ok(())
    }

    /// Extract environment variables from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        env_var_pattern()
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;
    use crate::pricing::{PriceTable, Rate};
    use crate::providers::adapter::ProviderKind;

    #[test]
    fn test_env_var_extraction() {
        let validator = ConfigValidator::new();

        let text = "api_key: ${OPENAI_API_KEY}, url: ${API_BASE_URL}";
        let vars = validator.extract_env_vars(text);

        assert_eq!(vars, vec!["OPENAI_API_KEY", "API_BASE_URL"]);
    }

    #[test]
    fn test_negative_price_rejected() {
        let config = GatewayConfig::default()
            .with_pricing(PriceTable::empty().with_rate("openai", Rate::metered(-1.0, 2.0)));
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "pricing.openai.input_per_million");
    }

    #[test]
    fn test_unresolved_placeholder_rejected() {
        let config = GatewayConfig::default()
            .with_provider(ProviderSettings::new(ProviderKind::Groq, "${GROQ_API}"));
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "providers[0].api_key");
    }

    #[test]
    fn test_missing_price_is_only_a_warning() {
        let config = GatewayConfig::default()
            .with_provider(ProviderSettings::new(ProviderKind::Groq, "gsk_live"))
            .with_pricing(PriceTable::empty());
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }
}
