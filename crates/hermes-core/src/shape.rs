//! Expected shapes of parameter values.
//!
//! A [`Shape`] is produced upstream alongside the route table. The binder never
//! looks inside it; it is handed to the [`Validator`](crate::Validator).
//!
//! Shapes deserialize from the route-table JSON:
//!
//! ```
//! use hermes_core::{DataType, Shape};
//!
//! let shape: Shape = serde_json::from_str(r#"{
//!     "dataType": "array",
//!     "required": true,
//!     "array": { "dataType": "integer" },
//!     "validators": { "maxItems": { "value": 3 } }
//! }"#).unwrap();
//!
//! assert_eq!(shape.data_type, DataType::Array);
//! assert_eq!(shape.array.as_ref().unwrap().data_type, DataType::Integer);
//! assert_eq!(shape.validators.max_items.as_ref().unwrap().value, 3);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primitive or structural type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// UTF-8 string.
    String,
    /// 32-bit style integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Single precision number.
    Float,
    /// Double precision number.
    Double,
    /// `true` / `false`.
    Boolean,
    /// ISO 8601 date (`YYYY-MM-DD`).
    Date,
    /// RFC 3339 date-time.
    Datetime,
    /// One of a fixed set of values (see [`Shape::enums`]).
    Enum,
    /// Homogeneous list (see [`Shape::array`]).
    Array,
    /// JSON object (see [`Shape::properties`]).
    Object,
    /// An uploaded file.
    File,
    /// Anything; not checked.
    #[default]
    Any,
}

impl DataType {
    /// Lowercase name as used in the route table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Object => "object",
            Self::File => "file",
            Self::Any => "any",
        }
    }
}

/// A validation rule with an optional custom error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule<T> {
    /// Rule parameter.
    pub value: T,
    /// Message to record instead of the default one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl<T> Rule<T> {
    /// Creates a rule with the default message.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            error_msg: None,
        }
    }

    /// Picks the custom message if one was configured.
    #[must_use]
    pub fn message_or(&self, default: impl FnOnce() -> String) -> String {
        self.error_msg.clone().unwrap_or_else(default)
    }
}

/// Additional constraints on top of the data type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Validators {
    /// Inclusive numeric lower bound.
    pub minimum: Option<Rule<f64>>,
    /// Inclusive numeric upper bound.
    pub maximum: Option<Rule<f64>>,
    /// Minimum string length in characters.
    pub min_length: Option<Rule<usize>>,
    /// Maximum string length in characters.
    pub max_length: Option<Rule<usize>>,
    /// Regular expression strings must match.
    pub pattern: Option<Rule<String>>,
    /// Minimum array length.
    pub min_items: Option<Rule<usize>>,
    /// Maximum array length.
    pub max_items: Option<Rule<usize>>,
}

impl Validators {
    /// Returns `true` if no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Expected shape of one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// The value's type.
    #[serde(default)]
    pub data_type: DataType,

    /// Whether a value must be present.
    #[serde(default)]
    pub required: bool,

    /// Element shape for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<Box<Shape>>,

    /// Allowed values for enums.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enums: Option<Vec<Value>>,

    /// Declared properties for objects, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Shape>>,

    /// Value used when an optional parameter is absent.
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Extra constraints.
    #[serde(default, skip_serializing_if = "Validators::is_empty")]
    pub validators: Validators,
}

impl Shape {
    /// Creates an optional shape of the given type.
    #[must_use]
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Self::default()
        }
    }

    /// Optional string.
    #[must_use]
    pub fn string() -> Self {
        Self::new(DataType::String)
    }

    /// Optional integer.
    #[must_use]
    pub fn integer() -> Self {
        Self::new(DataType::Integer)
    }

    /// Optional double.
    #[must_use]
    pub fn double() -> Self {
        Self::new(DataType::Double)
    }

    /// Optional boolean.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(DataType::Boolean)
    }

    /// Optional value of any type.
    #[must_use]
    pub fn any() -> Self {
        Self::new(DataType::Any)
    }

    /// Optional single file.
    #[must_use]
    pub fn file() -> Self {
        Self::new(DataType::File)
    }

    /// Optional array of `element`.
    #[must_use]
    pub fn array_of(element: Shape) -> Self {
        Self {
            array: Some(Box::new(element)),
            ..Self::new(DataType::Array)
        }
    }

    /// Optional enum over `values`.
    #[must_use]
    pub fn one_of(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            enums: Some(values.into_iter().collect()),
            ..Self::new(DataType::Enum)
        }
    }

    /// Optional object with declared properties.
    #[must_use]
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Shape)>,
        K: Into<String>,
    {
        Self {
            properties: Some(
                properties
                    .into_iter()
                    .map(|(k, v)| (k.into(), v))
                    .collect(),
            ),
            ..Self::new(DataType::Object)
        }
    }

    /// Marks the value as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value used when absent.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Replaces the validators.
    #[must_use]
    pub fn with_validators(mut self, validators: Validators) -> Self {
        self.validators = validators;
        self
    }

    /// Returns `true` for `array` of `file`.
    #[must_use]
    pub fn is_file_array(&self) -> bool {
        self.data_type == DataType::Array
            && self
                .array
                .as_ref()
                .is_some_and(|element| element.data_type == DataType::File)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_when_fields_absent() {
        let shape: Shape = serde_json::from_str("{}").unwrap();
        assert_eq!(shape.data_type, DataType::Any);
        assert!(!shape.required);
        assert!(shape.validators.is_empty());
    }

    #[test]
    fn test_rule_custom_message() {
        let shape: Shape = serde_json::from_value(json!({
            "dataType": "string",
            "validators": { "minLength": { "value": 2, "errorMsg": "too short" } }
        }))
        .unwrap();

        let rule = shape.validators.min_length.unwrap();
        assert_eq!(rule.value, 2);
        assert_eq!(rule.message_or(|| "default".into()), "too short");
    }

    #[test]
    fn test_file_array_detection() {
        assert!(Shape::array_of(Shape::file()).is_file_array());
        assert!(!Shape::array_of(Shape::string()).is_file_array());
        assert!(!Shape::file().is_file_array());
    }

    #[test]
    fn test_object_properties_keep_order() {
        let shape = Shape::object([
            ("zeta", Shape::string()),
            ("alpha", Shape::integer().required()),
        ]);
        let keys: Vec<_> = shape.properties.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_default_value_rename() {
        let shape: Shape =
            serde_json::from_value(json!({"dataType": "integer", "default": 10})).unwrap();
        assert_eq!(shape.default_value, Some(json!(10)));
    }
}
