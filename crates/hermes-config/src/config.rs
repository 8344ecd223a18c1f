//! The top-level configuration type.

use hermes_core::ValidationConfig;
use hermes_extract::ExtractConfig;
use hermes_telemetry::{create_env_filter, LogConfig};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Configuration of a Hermes deployment.
///
/// Unknown fields are rejected in every section.
///
/// # Example
///
/// ```rust
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert!(config.validation.body_coercion);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HermesConfig {
    /// Options handed to the validator.
    pub validation: ValidationConfig,

    /// Request body limits.
    pub extract: ExtractConfig,

    /// Logging setup.
    pub logging: LogConfig,
}

impl HermesConfig {
    /// Defaults with human-readable debug logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Defaults with JSON logging.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero limit or a log level
    /// that is not a valid filter directive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("extract.max_body_size", self.extract.max_body_size),
            ("extract.max_field_size", self.extract.max_field_size),
            ("extract.max_fields", self.extract.max_fields),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::invalid_value(field, "must be greater than 0"));
            }
        }

        if self.extract.max_field_size > self.extract.max_body_size {
            return Err(ConfigError::invalid_value(
                "extract.max_field_size",
                "must not exceed extract.max_body_size",
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::AdditionalProperties;
    use hermes_telemetry::LogFormat;

    #[test]
    fn test_presets() {
        assert_eq!(HermesConfig::development().logging.format, LogFormat::Pretty);
        assert_eq!(HermesConfig::production().logging.format, LogFormat::Json);
        assert_eq!(
            HermesConfig::development().validation,
            HermesConfig::production().validation
        );
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let config: HermesConfig = toml::from_str(
            r#"
                [validation]
                no_implicit_additional_properties = "throw-on-extras"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.validation.no_implicit_additional_properties,
            AdditionalProperties::ThrowOnExtras
        );
        assert!(config.validation.body_coercion);
        assert_eq!(config.extract, ExtractConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<HermesConfig, _> = toml::from_str("[server]\nport = 8080\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_limit_invalid() {
        let mut config = HermesConfig::default();
        config.extract.max_fields = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "extract.max_fields"));
    }

    #[test]
    fn test_field_limit_above_body_limit_invalid() {
        let mut config = HermesConfig::default();
        config.extract.max_body_size = 10;
        config.extract.max_field_size = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_level_invalid_only_when_enabled() {
        let mut config = HermesConfig::default();
        config.logging.level = "hermes=notalevel".to_string();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }
}
