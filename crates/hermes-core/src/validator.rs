//! Default shape-driven validator.
//!
//! [`ShapeValidator`] checks values against a [`Shape`] and converts them
//! along the way: path, query, header and form values arrive as strings and
//! are coerced into the declared scalar type.
//!
//! # Example
//!
//! ```
//! use hermes_core::{FieldErrors, ParamSpec, Shape, ShapeValidator, ValidationConfig, Validator};
//! use serde_json::json;
//!
//! let validator = ShapeValidator::new();
//! let spec = ParamSpec::path("id", Shape::integer().required());
//! let mut errors = FieldErrors::new();
//!
//! let value = validator.validate_param(
//!     &spec, Some("42".into()), "id", &mut errors, "", &ValidationConfig::default(),
//! );
//! assert_eq!(value.unwrap().as_json(), Some(&json!(42)));
//! assert!(!errors.has_errors());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use parking_lot::Mutex;
use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::{
    AdditionalProperties, DataType, FieldErrors, ParamSpec, ParamValue, Shape, UploadedFile,
    ValidationConfig, Validator,
};

/// Validates values against their declared [`Shape`].
#[derive(Debug, Default)]
pub struct ShapeValidator {
    patterns: Mutex<HashMap<String, Regex>>,
}

/// Per-call state threaded through nested checks.
struct Pass<'a> {
    errors: &'a mut FieldErrors,
    config: &'a ValidationConfig,
    coerce: bool,
}

impl ShapeValidator {
    /// Creates a validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check(
        &self,
        shape: &Shape,
        raw: Option<ParamValue>,
        name: &str,
        prefix: &str,
        pass: &mut Pass<'_>,
    ) -> Option<ParamValue> {
        let path = format!("{prefix}{name}");
        match raw {
            None | Some(ParamValue::Json(Value::Null)) => {
                if shape.required {
                    pass.errors
                        .record(path, format!("'{name}' is required"), None);
                    None
                } else {
                    shape.default_value.clone().map(ParamValue::Json)
                }
            }
            Some(ParamValue::File(file)) => check_file(shape, vec![file], false, &path, pass),
            Some(ParamValue::Files(files)) => check_file(shape, files, true, &path, pass),
            Some(ParamValue::Json(value)) => self
                .check_json(shape, value, name, prefix, pass)
                .map(ParamValue::Json),
        }
    }

    fn check_json(
        &self,
        shape: &Shape,
        value: Value,
        name: &str,
        prefix: &str,
        pass: &mut Pass<'_>,
    ) -> Option<Value> {
        let path = format!("{prefix}{name}");
        match shape.data_type {
            DataType::Any => Some(value),
            DataType::String => self.check_string(shape, value, &path, pass),
            DataType::Integer | DataType::Long => check_integer(shape, value, &path, pass),
            DataType::Float | DataType::Double => check_number(shape, value, &path, pass),
            DataType::Boolean => check_boolean(value, &path, pass),
            DataType::Date => check_date(value, &path, pass),
            DataType::Datetime => check_datetime(value, &path, pass),
            DataType::Enum => check_enum(shape, value, &path, pass),
            DataType::Array => self.check_array(shape, value, name, prefix, pass),
            DataType::Object => self.check_object(shape, value, name, prefix, pass),
            DataType::File => {
                pass.errors.record(path, "invalid file", Some(value));
                None
            }
        }
    }

    fn check_string(
        &self,
        shape: &Shape,
        value: Value,
        path: &str,
        pass: &mut Pass<'_>,
    ) -> Option<Value> {
        let Value::String(text) = &value else {
            pass.errors.record(path, "invalid string value", Some(value));
            return None;
        };

        let rules = &shape.validators;
        let length = text.chars().count();
        if let Some(rule) = &rules.min_length {
            if length < rule.value {
                let message = rule.message_or(|| format!("minLength {}", rule.value));
                pass.errors.record(path, message, Some(value));
                return None;
            }
        }
        if let Some(rule) = &rules.max_length {
            if length > rule.value {
                let message = rule.message_or(|| format!("maxLength {}", rule.value));
                pass.errors.record(path, message, Some(value));
                return None;
            }
        }
        if let Some(rule) = &rules.pattern {
            if self.is_match(&rule.value, text) == Some(false) {
                let message = rule.message_or(|| format!("not match in '{}'", rule.value));
                pass.errors.record(path, message, Some(value));
                return None;
            }
        }
        Some(value)
    }

    fn check_array(
        &self,
        shape: &Shape,
        value: Value,
        name: &str,
        prefix: &str,
        pass: &mut Pass<'_>,
    ) -> Option<Value> {
        let path = format!("{prefix}{name}");
        let items = match value {
            Value::Array(items) => items,
            // a lone string where a list was expected, e.g. `?ids=5`
            Value::String(single) if pass.coerce => vec![Value::String(single)],
            other => {
                pass.errors.record(path, "invalid array", Some(other));
                return None;
            }
        };

        let rules = &shape.validators;
        if let Some(rule) = &rules.min_items {
            if items.len() < rule.value {
                let message = rule.message_or(|| format!("minItems {}", rule.value));
                pass.errors.record(path, message, Some(Value::Array(items)));
                return None;
            }
        }
        if let Some(rule) = &rules.max_items {
            if items.len() > rule.value {
                let message = rule.message_or(|| format!("maxItems {}", rule.value));
                pass.errors.record(path, message, Some(Value::Array(items)));
                return None;
            }
        }

        let Some(element) = shape.array.as_deref() else {
            return Some(Value::Array(items));
        };

        let before = pass.errors.len();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let item_name = format!("{name}.${index}");
            let checked =
                self.check(element, Some(ParamValue::Json(item)), &item_name, prefix, pass);
            out.push(checked.and_then(ParamValue::into_json).unwrap_or(Value::Null));
        }

        (pass.errors.len() == before).then_some(Value::Array(out))
    }

    fn check_object(
        &self,
        shape: &Shape,
        value: Value,
        name: &str,
        prefix: &str,
        pass: &mut Pass<'_>,
    ) -> Option<Value> {
        let path = format!("{prefix}{name}");
        let mut input = match value {
            Value::Object(input) => input,
            other => {
                pass.errors.record(path, "invalid object", Some(other));
                return None;
            }
        };

        let Some(properties) = &shape.properties else {
            return Some(Value::Object(input));
        };

        let before = pass.errors.len();
        let nested = format!("{path}.");
        let mut out = Map::new();

        for (key, property) in properties {
            let raw = input.shift_remove(key).map(ParamValue::Json);
            if let Some(checked) = self.check(property, raw, key, &nested, pass) {
                if let Some(json) = checked.into_json() {
                    out.insert(key.clone(), json);
                }
            }
        }

        match pass.config.no_implicit_additional_properties {
            AdditionalProperties::Ignore => out.extend(input),
            AdditionalProperties::SilentlyRemoveExtras => {}
            AdditionalProperties::ThrowOnExtras => {
                for (key, extra) in input {
                    pass.errors.record(
                        format!("{nested}{key}"),
                        format!("\"{key}\" is an excess property and therefore is not allowed"),
                        Some(extra),
                    );
                }
            }
        }

        (pass.errors.len() == before).then_some(Value::Object(out))
    }

    /// `None` when the pattern does not compile.
    fn is_match(&self, pattern: &str, text: &str) -> Option<bool> {
        let mut cache = self.patterns.lock();
        if let Some(regex) = cache.get(pattern) {
            return Some(regex.is_match(text));
        }
        match Regex::new(pattern) {
            Ok(regex) => {
                let matched = regex.is_match(text);
                cache.insert(pattern.to_string(), regex);
                Some(matched)
            }
            Err(error) => {
                warn!(pattern, %error, "ignoring invalid pattern rule");
                None
            }
        }
    }
}

impl Validator for ShapeValidator {
    fn validate_param(
        &self,
        spec: &ParamSpec,
        raw: Option<ParamValue>,
        name: &str,
        errors: &mut FieldErrors,
        prefix: &str,
        config: &ValidationConfig,
    ) -> Option<ParamValue> {
        let mut pass = Pass {
            errors,
            config,
            coerce: !spec.source.is_body() || config.body_coercion,
        };
        self.check(&spec.shape, raw, name, prefix, &mut pass)
    }
}

fn check_file(
    shape: &Shape,
    mut files: Vec<UploadedFile>,
    many: bool,
    path: &str,
    pass: &mut Pass<'_>,
) -> Option<ParamValue> {
    match shape.data_type {
        DataType::Any if many => Some(ParamValue::Files(files)),
        DataType::File | DataType::Any if files.len() == 1 => files.pop().map(ParamValue::File),
        _ if shape.is_file_array() => Some(ParamValue::Files(files)),
        _ => {
            let described = if many {
                ParamValue::Files(files).describe()
            } else {
                files.first().map_or(Value::Null, |f| ParamValue::File(f.clone()).describe())
            };
            pass.errors.record(path, "invalid file", Some(described));
            None
        }
    }
}

fn check_integer(shape: &Shape, value: Value, path: &str, pass: &mut Pass<'_>) -> Option<Value> {
    let parsed = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) if pass.coerce => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };

    let Some(number) = parsed else {
        pass.errors.record(path, "invalid integer number", Some(value));
        return None;
    };

    #[allow(clippy::cast_precision_loss)]
    let as_float = number as f64;
    if !within_range(shape, as_float, &value, path, pass) {
        return None;
    }
    Some(Value::from(number))
}

fn check_number(shape: &Shape, value: Value, path: &str, pass: &mut Pass<'_>) -> Option<Value> {
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if pass.coerce => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    };

    let Some(number) = parsed.and_then(Number::from_f64) else {
        let message = if shape.data_type == DataType::Float {
            "invalid float number"
        } else {
            "invalid double number"
        };
        pass.errors.record(path, message, Some(value));
        return None;
    };

    let as_float = number.as_f64().unwrap_or_default();
    if !within_range(shape, as_float, &value, path, pass) {
        return None;
    }
    // Keep integral JSON numbers as they were sent.
    match value {
        Value::Number(original) => Some(Value::Number(original)),
        _ => Some(Value::Number(number)),
    }
}

fn check_boolean(value: Value, path: &str, pass: &mut Pass<'_>) -> Option<Value> {
    let parsed = match &value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) if pass.coerce => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) if pass.coerce => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };

    if parsed.is_none() {
        pass.errors.record(path, "invalid boolean value", Some(value));
    }
    parsed.map(Value::Bool)
}

fn check_date(value: Value, path: &str, pass: &mut Pass<'_>) -> Option<Value> {
    let valid = value
        .as_str()
        .is_some_and(|s| s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok());
    if valid {
        Some(value)
    } else {
        pass.errors.record(
            path,
            "invalid ISO 8601 date format, i.e. YYYY-MM-DD",
            Some(value),
        );
        None
    }
}

fn check_datetime(value: Value, path: &str, pass: &mut Pass<'_>) -> Option<Value> {
    let valid = value
        .as_str()
        .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok());
    if valid {
        Some(value)
    } else {
        pass.errors.record(
            path,
            "invalid ISO 8601 datetime format, i.e. YYYY-MM-DDTHH:MM:SS",
            Some(value),
        );
        None
    }
}

fn check_enum(shape: &Shape, value: Value, path: &str, pass: &mut Pass<'_>) -> Option<Value> {
    let members = shape.enums.as_deref().unwrap_or_default();

    if let Some(member) = members.iter().find(|m| **m == value) {
        return Some(member.clone());
    }
    if pass.coerce {
        let text = display(&value);
        if let Some(member) = members.iter().find(|m| display(m) == text) {
            return Some(member.clone());
        }
    }

    let listed: Vec<String> = members.iter().map(display).collect();
    pass.errors.record(
        path,
        format!("should be one of the following; ['{}']", listed.join("', '")),
        Some(value),
    );
    None
}

fn within_range(shape: &Shape, number: f64, value: &Value, path: &str, pass: &mut Pass<'_>) -> bool {
    let rules = &shape.validators;
    if let Some(rule) = &rules.minimum {
        if number < rule.value {
            let message = rule.message_or(|| format!("min {}", rule.value));
            pass.errors.record(path, message, Some(value.clone()));
            return false;
        }
    }
    if let Some(rule) = &rules.maximum {
        if number > rule.value {
            let message = rule.message_or(|| format!("max {}", rule.value));
            pass.errors.record(path, message, Some(value.clone()));
            return false;
        }
    }
    true
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
