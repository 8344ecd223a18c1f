//! Parameter specifications.
//!
//! A [`ParamSpec`] says where a handler argument comes from and what shape it
//! must have. Specs are read from the route table:
//!
//! ```
//! use hermes_core::{FormKind, ParamSource, ParamSpec};
//!
//! let spec: ParamSpec = serde_json::from_str(
//!     r#"{ "name": "id", "in": "path", "dataType": "integer", "required": true }"#,
//! ).unwrap();
//! assert_eq!(spec.source, ParamSource::Path);
//!
//! let upload: ParamSpec = serde_json::from_str(
//!     r#"{ "name": "docs", "in": "formData", "dataType": "array", "array": { "dataType": "file" } }"#,
//! ).unwrap();
//! assert_eq!(upload.source, ParamSource::FormData(FormKind::Files));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DataType, Shape};

/// What part of a `formData` payload a parameter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// A single uploaded file.
    File,
    /// A list of uploaded files.
    Files,
    /// A plain form field.
    Field,
}

impl FormKind {
    /// Derives the kind from the declared shape.
    #[must_use]
    pub fn from_shape(shape: &Shape) -> Self {
        if shape.data_type == DataType::File {
            Self::File
        } else if shape.is_file_array() {
            Self::Files
        } else {
            Self::Field
        }
    }
}

/// Where a parameter's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// A named path segment.
    Path,
    /// A single named query parameter.
    Query,
    /// The whole query mapping.
    Queries,
    /// A single named header.
    Header,
    /// The whole body.
    Body,
    /// A named property of the body (`body-prop`).
    BodyField,
    /// A multipart form entry.
    FormData(FormKind),
    /// The transport's raw request handle.
    Request,
    /// A responder bound to this exchange (`res`).
    Responder,
    /// A source tag this runtime does not know.
    Unrecognized(String),
}

impl ParamSource {
    /// Maps a route-table `in` tag to a source.
    ///
    /// `shape` is consulted for `formData` only.
    #[must_use]
    pub fn from_tag(tag: &str, shape: &Shape) -> Self {
        match tag {
            "path" => Self::Path,
            "query" => Self::Query,
            "queries" => Self::Queries,
            "header" => Self::Header,
            "body" => Self::Body,
            "body-prop" => Self::BodyField,
            "formData" => Self::FormData(FormKind::from_shape(shape)),
            "request" => Self::Request,
            "res" => Self::Responder,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The route-table tag for this source.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Queries => "queries",
            Self::Header => "header",
            Self::Body => "body",
            Self::BodyField => "body-prop",
            Self::FormData(_) => "formData",
            Self::Request => "request",
            Self::Responder => "res",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Returns `true` for sources read from the request body.
    #[must_use]
    pub fn is_body(&self) -> bool {
        matches!(self, Self::Body | Self::BodyField)
    }

    /// Field-path prefix used when recording errors.
    #[must_use]
    pub fn error_prefix(&self) -> &'static str {
        match self {
            Self::BodyField => "body.",
            _ => "",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Specification of one operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawParamSpec", into = "RawParamSpec")]
pub struct ParamSpec {
    /// Parameter name, unique within the operation.
    pub name: String,
    /// Where the value comes from.
    pub source: ParamSource,
    /// Expected shape, handed to the validator.
    pub shape: Shape,
}

impl ParamSpec {
    /// Creates a spec.
    #[must_use]
    pub fn new(name: impl Into<String>, source: ParamSource, shape: Shape) -> Self {
        Self {
            name: name.into(),
            source,
            shape,
        }
    }

    /// Path parameter.
    #[must_use]
    pub fn path(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, ParamSource::Path, shape)
    }

    /// Single query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, ParamSource::Query, shape)
    }

    /// Whole query mapping.
    #[must_use]
    pub fn queries(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, ParamSource::Queries, shape)
    }

    /// Single header.
    #[must_use]
    pub fn header(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, ParamSource::Header, shape)
    }

    /// Whole body.
    #[must_use]
    pub fn body(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, ParamSource::Body, shape)
    }

    /// Named body property.
    #[must_use]
    pub fn body_field(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, ParamSource::BodyField, shape)
    }

    /// Form entry; the kind follows the shape.
    #[must_use]
    pub fn form(name: impl Into<String>, shape: Shape) -> Self {
        let kind = FormKind::from_shape(&shape);
        Self::new(name, ParamSource::FormData(kind), shape)
    }

    /// The raw request handle.
    #[must_use]
    pub fn request(name: impl Into<String>) -> Self {
        Self::new(name, ParamSource::Request, Shape::any())
    }

    /// A responder for this exchange.
    #[must_use]
    pub fn responder(name: impl Into<String>) -> Self {
        Self::new(name, ParamSource::Responder, Shape::any())
    }
}

#[derive(Serialize, Deserialize)]
struct RawParamSpec {
    name: String,
    #[serde(rename = "in")]
    source: String,
    #[serde(flatten)]
    shape: Shape,
}

impl From<RawParamSpec> for ParamSpec {
    fn from(raw: RawParamSpec) -> Self {
        let source = ParamSource::from_tag(&raw.source, &raw.shape);
        Self {
            name: raw.name,
            source,
            shape: raw.shape,
        }
    }
}

impl From<ParamSpec> for RawParamSpec {
    fn from(spec: ParamSpec) -> Self {
        Self {
            name: spec.name,
            source: spec.source.tag().to_string(),
            shape: spec.shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_tags() {
        let shape = Shape::any();
        for (tag, expected) in [
            ("path", ParamSource::Path),
            ("query", ParamSource::Query),
            ("queries", ParamSource::Queries),
            ("header", ParamSource::Header),
            ("body", ParamSource::Body),
            ("body-prop", ParamSource::BodyField),
            ("request", ParamSource::Request),
            ("res", ParamSource::Responder),
        ] {
            let source = ParamSource::from_tag(tag, &shape);
            assert_eq!(source, expected);
            assert_eq!(source.tag(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_kept() {
        let source = ParamSource::from_tag("cookie", &Shape::any());
        assert_eq!(source, ParamSource::Unrecognized("cookie".into()));
        assert_eq!(source.to_string(), "cookie");
    }

    #[test]
    fn test_form_kind_from_shape() {
        assert_eq!(FormKind::from_shape(&Shape::file()), FormKind::File);
        assert_eq!(
            FormKind::from_shape(&Shape::array_of(Shape::file())),
            FormKind::Files
        );
        assert_eq!(FormKind::from_shape(&Shape::string()), FormKind::Field);
        assert_eq!(
            FormKind::from_shape(&Shape::array_of(Shape::string())),
            FormKind::Field
        );
    }

    #[test]
    fn test_deserialize_flattened_shape() {
        let spec: ParamSpec = serde_json::from_value(json!({
            "name": "limit",
            "in": "query",
            "dataType": "integer",
            "required": false,
            "default": 20,
            "validators": { "maximum": { "value": 100 } }
        }))
        .unwrap();

        assert_eq!(spec.name, "limit");
        assert_eq!(spec.source, ParamSource::Query);
        assert_eq!(spec.shape.data_type, DataType::Integer);
        assert_eq!(spec.shape.default_value, Some(json!(20)));
    }

    #[test]
    fn test_serialize_uses_route_table_tags() {
        let spec = ParamSpec::body_field("email", Shape::string().required());
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["in"], "body-prop");
        assert_eq!(value["dataType"], "string");
        assert_eq!(value["required"], true);
    }

    #[test]
    fn test_error_prefix() {
        assert_eq!(ParamSource::BodyField.error_prefix(), "body.");
        assert_eq!(ParamSource::Body.error_prefix(), "");
        assert_eq!(ParamSource::Query.error_prefix(), "");
    }
}
