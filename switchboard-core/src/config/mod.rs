//! Gateway configuration
//!
//! Providers, credentials, connection settings, token limits and prices.
//! Configuration can be loaded from YAML or JSON files (with `${VAR}`
//! interpolation) or assembled from well-known environment variables.

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::{api_key_vars, interpolate_env_vars};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    default_retry_policy, ConnectionConfig, DefaultConfig, GatewayConfig, ProviderSettings,
    SUPPORTED_VERSION,
};
pub use secrets::{SafeLogging, SecretString};
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

impl GatewayConfig {
    /// Build a configuration from `ANT_API`/`ANTHROPIC_API_KEY`,
    /// `OPENAI_API`/`OPENAI_API_KEY` and `GROQ_API`/`GROQ_API_KEY`
    pub fn from_env() -> ConfigResult<Self> {
        let config = env::config_from_env()?;
        ConfigValidator::new().validate(&config)?;
        Ok(config)
    }
}

fn read_interpolated(path: &Path) -> ConfigResult<String> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    env::interpolate_env_vars(&content)
}

fn finish(mut config: GatewayConfig) -> ConfigResult<GatewayConfig> {
    env::interpolate_config_env_vars(&mut config)?;
    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<GatewayConfig> {
    let path = path.as_ref();
    let interpolated = read_interpolated(path)?;

    let config: GatewayConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    finish(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<GatewayConfig> {
    let path = path.as_ref();
    let interpolated = read_interpolated(path)?;

    let config: GatewayConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    finish(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::adapter::ProviderKind;
    use crate::providers::retry::Backoff;

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
version: "0.1"
providers:
  - type: groq
    api_key: gsk_test_key
    retry_policy:
      max_attempts: 5
      backoff:
        kind: linear
        step_ms: 100
  - type: anthropic
    api_key: sk-ant-test
    base_url: http://localhost:4010/v1
connection:
  request_timeout_ms: 5000
defaults:
  max_tokens: 1024
pricing:
  anthropic:
    kind: metered
    input_per_million: 3.0
    output_per_million: 15.0
  groq:
    kind: free
"#;
        let config: GatewayConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(ConfigValidator::new().validate(&config).is_ok());

        let groq = config.provider(ProviderKind::Groq).unwrap();
        let policy = groq.effective_retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Backoff::Linear { step_ms: 100 });
        assert_eq!(policy.retry_on_status, vec![503]);

        assert_eq!(config.connection.request_timeout_ms, 5000);
        assert_eq!(config.connection.connect_timeout_ms, 10_000);
        assert_eq!(config.defaults.max_tokens, 1024);
        assert!(config.provider(ProviderKind::OpenAI).is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
version: "0.1"
routing:
  strategy: round_robin
"#;
        assert!(serde_yaml::from_str::<GatewayConfig>(yaml).is_err());
    }
}
