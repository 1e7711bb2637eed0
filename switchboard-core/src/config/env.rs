//! Environment variable handling for configuration
//!
//! Two jobs: `${VAR}` interpolation in config files, and building a
//! configuration straight from the process environment.

use super::error::{ConfigError, ConfigResult};
use super::schema::{GatewayConfig, ProviderSettings};
use super::secrets::SecretString;
use crate::providers::adapter::ProviderKind;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

/// Pattern for `${VAR}` placeholders
pub(crate) fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Variables holding each provider's API key, in lookup order
pub fn api_key_vars(kind: ProviderKind) -> &'static [&'static str] {
    match kind {
        ProviderKind::Anthropic => &["ANT_API", "ANTHROPIC_API_KEY"],
        ProviderKind::OpenAI => &["OPENAI_API", "OPENAI_API_KEY"],
        ProviderKind::Groq => &["GROQ_API", "GROQ_API_KEY"],
    }
}

/// Interpolate environment variables in a configuration string
pub fn interpolate_env_vars(content: &str) -> ConfigResult<String> {
    let mut missing: Option<String> = None;

    let result = env_var_pattern().replace_all(content, |caps: &regex::Captures<'_>| {
        match env::var(&caps[1]) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| caps[1].to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var) => Err(ConfigError::EnvVarNotFound { var }),
        None => Ok(result.into_owned()),
    }
}

/// Interpolate placeholders left in provider fields after parsing
pub fn interpolate_config_env_vars(config: &mut GatewayConfig) -> ConfigResult<()> {
    for provider in &mut config.providers {
        let api_key = provider.api_key.expose_secret();
        if env_var_pattern().is_match(api_key) {
            let interpolated = interpolate_env_vars(api_key)?;
            provider.api_key = SecretString::new(interpolated);
        }

        if let Some(base_url) = &provider.base_url {
            if env_var_pattern().is_match(base_url) {
                provider.base_url = Some(interpolate_env_vars(base_url)?);
            }
        }
    }

    Ok(())
}

/// First non-empty value among `vars`
fn first_set(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Configuration with one provider entry per API key found in the environment
pub fn config_from_env() -> ConfigResult<GatewayConfig> {
    let config = ProviderKind::ALL
        .into_iter()
        .filter_map(|kind| {
            first_set(api_key_vars(kind)).map(|key| ProviderSettings::new(kind, key))
        })
        .fold(GatewayConfig::default(), GatewayConfig::with_provider);

    if config.providers.is_empty() {
        let checked = ProviderKind::ALL
            .iter()
            .flat_map(|kind| api_key_vars(*kind).iter().copied())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ConfigError::NoProviders { checked });
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env_vars() {
        env::set_var("SWITCHBOARD_TEST_VAR", "test_value");

        let content = "api_key: ${SWITCHBOARD_TEST_VAR}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "api_key: test_value");

        env::remove_var("SWITCHBOARD_TEST_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let result = interpolate_env_vars("api_key: ${SWITCHBOARD_MISSING_VAR}");

        match result {
            Err(ConfigError::EnvVarNotFound { var }) => {
                assert_eq!(var, "SWITCHBOARD_MISSING_VAR")
            }
            other => panic!("Expected EnvVarNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_env_vars() {
        env::set_var("SWITCHBOARD_VAR1", "value1");
        env::set_var("SWITCHBOARD_VAR2", "value2");

        let content = "key1: ${SWITCHBOARD_VAR1}, key2: ${SWITCHBOARD_VAR2}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "key1: value1, key2: value2");

        env::remove_var("SWITCHBOARD_VAR1");
        env::remove_var("SWITCHBOARD_VAR2");
    }

    #[test]
    fn test_api_key_lookup_order() {
        assert_eq!(api_key_vars(ProviderKind::Anthropic)[0], "ANT_API");
        assert_eq!(api_key_vars(ProviderKind::Groq)[1], "GROQ_API_KEY");
    }
}
