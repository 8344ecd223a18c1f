//! Loading complete configuration files.

use std::fs;

use hermes_config::{ConfigError, ConfigLoader, HermesConfig};
use hermes_core::AdditionalProperties;
use hermes_telemetry::LogFormat;

#[test]
fn test_complete_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hermes.toml");
    fs::write(
        &path,
        r#"
            [validation]
            no_implicit_additional_properties = "throw-on-extras"
            body_coercion = false

            [extract]
            max_body_size = 1048576
            max_field_size = 65536
            max_fields = 16

            [logging]
            enabled = true
            level = "hermes_dispatch=debug,info"
            format = "pretty"
            file_line_info = true
        "#,
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_optional_file(&path)
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(
        config.validation.no_implicit_additional_properties,
        AdditionalProperties::ThrowOnExtras
    );
    assert!(!config.validation.body_coercion);
    assert_eq!(config.extract.max_body_size, 1_048_576);
    assert_eq!(config.extract.max_fields, 16);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.logging.file_line_info);
}

#[test]
fn test_unknown_field_in_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hermes.toml");
    fs::write(&path, "[validation]\nstrict = true\n").unwrap();

    let result = ConfigLoader::new().with_file(&path);
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_json_file_replaces_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hermes.json");
    fs::write(&path, r#"{"extract": {"max_fields": 8}}"#).unwrap();

    let config = ConfigLoader::new()
        .with_development()
        .with_file(&path)
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.extract.max_fields, 8);
    assert_eq!(config.logging, HermesConfig::default().logging);
}

#[test]
fn test_env_prefix_without_matching_vars() {
    let config = ConfigLoader::new()
        .with_env_prefix("hermes_config_test_unset")
        .load()
        .unwrap();
    assert_eq!(config, HermesConfig::default());
}
