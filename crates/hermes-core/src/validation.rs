//! The validation capability consumed by argument binding.

use serde::{Deserialize, Serialize};

use crate::{FieldErrors, ParamSpec, ParamValue};

/// How to treat object properties that the shape does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdditionalProperties {
    /// Keep them as they are.
    #[default]
    Ignore,
    /// Drop them from the validated value.
    SilentlyRemoveExtras,
    /// Record one error per excess property.
    ThrowOnExtras,
}

/// Options handed to the validator on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Policy for undeclared object properties.
    pub no_implicit_additional_properties: AdditionalProperties,

    /// Coerce strings into scalars for body sources too.
    ///
    /// Path, query, header and form values are always coerced.
    pub body_coercion: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            no_implicit_additional_properties: AdditionalProperties::default(),
            body_coercion: true,
        }
    }
}

impl ValidationConfig {
    /// Sets the additional-properties policy.
    #[must_use]
    pub fn with_additional_properties(mut self, policy: AdditionalProperties) -> Self {
        self.no_implicit_additional_properties = policy;
        self
    }

    /// Enables or disables body coercion.
    #[must_use]
    pub fn with_body_coercion(mut self, enabled: bool) -> Self {
        self.body_coercion = enabled;
        self
    }
}

/// Validates and converts one raw parameter value.
///
/// Implementations never fail on their own. A problem is recorded in `errors`
/// under `prefix` + `name` (or a deeper path below it) and the return value is
/// then ignored by the caller. On success the converted value is returned;
/// `None` means the parameter is absent.
pub trait Validator: Send + Sync {
    /// Validates `raw` against `spec`.
    fn validate_param(
        &self,
        spec: &ParamSpec,
        raw: Option<ParamValue>,
        name: &str,
        errors: &mut FieldErrors,
        prefix: &str,
        config: &ValidationConfig,
    ) -> Option<ParamValue>;
}

impl<V: Validator + ?Sized> Validator for std::sync::Arc<V> {
    fn validate_param(
        &self,
        spec: &ParamSpec,
        raw: Option<ParamValue>,
        name: &str,
        errors: &mut FieldErrors,
        prefix: &str,
        config: &ValidationConfig,
    ) -> Option<ParamValue> {
        (**self).validate_param(spec, raw, name, errors, prefix, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(
            config.no_implicit_additional_properties,
            AdditionalProperties::Ignore
        );
        assert!(config.body_coercion);
    }

    #[test]
    fn test_policy_names() {
        let config: ValidationConfig = serde_json::from_str(
            r#"{ "no_implicit_additional_properties": "throw-on-extras", "body_coercion": false }"#,
        )
        .unwrap();
        assert_eq!(
            config.no_implicit_additional_properties,
            AdditionalProperties::ThrowOnExtras
        );
        assert!(!config.body_coercion);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<ValidationConfig, _> = serde_json::from_str(r#"{ "strict": true }"#);
        assert!(result.is_err());
    }
}
