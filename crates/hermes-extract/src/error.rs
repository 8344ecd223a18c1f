//! Extraction error types.
//!
//! These errors happen before any parameter is bound: the body could not be
//! read, was too large, or could not be parsed for its declared content type.

use std::fmt;

use hermes_core::ErrorEnvelope;
use http::StatusCode;

/// Error name used in the JSON envelope.
pub const EXTRACTION_ERROR_NAME: &str = "ExtractionError";

/// Part of the request being read when extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Query string.
    Query,
    /// Request body.
    Body,
    /// Content-Type header.
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// Error raised while reading or parsing a request payload.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::malformed(ExtractionSource::Body, "expected value at line 1");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.extraction_source(), ExtractionSource::Body);
///
/// let err = ExtractionError::payload_too_large(1024);
/// assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Payload could not be parsed
    Malformed,
    /// Body could not be read from the connection
    ReadFailed,
    /// Body or field exceeded a size limit
    PayloadTooLarge,
    /// Too many multipart fields
    TooManyFields,
    /// Content-Type is unsupported or unusable
    UnsupportedMediaType,
}

impl ExtractionError {
    /// Creates an error for a payload that failed to parse.
    #[must_use]
    pub fn malformed(source: ExtractionSource, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Malformed,
            message: format!("malformed {source}: {details}"),
        }
    }

    /// Creates an error for a body that could not be read.
    #[must_use]
    pub fn read_failed(details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::ReadFailed,
            message: format!("failed to read body: {details}"),
        }
    }

    /// Creates an error for a payload over `limit` bytes.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: limit is {limit} bytes"),
        }
    }

    /// Creates an error for a multipart body with more than `max` fields.
    #[must_use]
    pub fn too_many_fields(max: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::TooManyFields,
            message: format!("too many multipart fields (max {max})"),
        }
    }

    /// Creates an error for an unsupported or unusable content type.
    #[must_use]
    pub fn unsupported_media_type(actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("unsupported content type '{actual}'"),
        }
    }

    /// Creates an error for a content type missing a required parameter.
    #[must_use]
    pub fn invalid_content_type(details: impl Into<String>) -> Self {
        Self::malformed(ExtractionSource::ContentType, details)
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Malformed | ExtractionErrorKind::ReadFailed => {
                StatusCode::BAD_REQUEST
            }
            ExtractionErrorKind::PayloadTooLarge | ExtractionErrorKind::TooManyFields => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Malformed => "MALFORMED_PAYLOAD",
            ExtractionErrorKind::ReadFailed => "BODY_READ_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::TooManyFields => "TOO_MANY_FIELDS",
            ExtractionErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
        }
    }

    /// Builds the JSON error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            name: EXTRACTION_ERROR_NAME.to_string(),
            message: self.message.clone(),
            fields: None,
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}
