//! Error kinds raised while dispatching a request.
//!
//! There are two failure kinds:
//!
//! - [`ValidationFailure`]: parameter binding failed. Carries every failing
//!   field. Maps to `400 Bad Request`.
//! - [`HandlerFailure`]: the user handler failed. Opaque to the dispatcher; it
//!   is re-signaled or translated, never recovered. Maps to its own status, or
//!   `500 Internal Server Error`.
//!
//! [`DispatchError`] is the union of both and is what transports re-signal to
//! their upstream error pipeline.

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FieldErrors;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Error name reported for validation failures.
pub const VALIDATION_ERROR_NAME: &str = "ValidateError";

/// Error name reported for handler failures that carry no name of their own.
pub const DEFAULT_ERROR_NAME: &str = "Error";

/// Parameter binding failed for one or more fields.
///
/// # Example
///
/// ```
/// use hermes_core::{FieldErrors, ValidationFailure};
/// use http::StatusCode;
///
/// let mut fields = FieldErrors::new();
/// fields.record("id", "invalid integer number", None);
///
/// let failure = ValidationFailure::new(fields, "");
/// assert_eq!(failure.status_code(), StatusCode::BAD_REQUEST);
/// assert!(failure.to_string().contains("id"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    fields: FieldErrors,
    message: String,
}

impl ValidationFailure {
    /// Creates a failure from a set of field errors and a top-level message.
    #[must_use]
    pub fn new(fields: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            fields,
            message: message.into(),
        }
    }

    /// Replaces the top-level message. Callers use this to attach context.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// The failing fields, in discovery order.
    #[must_use]
    pub fn fields(&self) -> &FieldErrors {
        &self.fields
    }

    /// Consumes the failure, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> FieldErrors {
        self.fields
    }

    /// The top-level message. Empty unless a caller attached one.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Always `400 Bad Request`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Builds the JSON error envelope enumerating every failing field.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            name: VALIDATION_ERROR_NAME.to_string(),
            message: self.to_string(),
            fields: Some(self.fields.clone()),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            return write!(f, "{}", self.message);
        }
        let paths: Vec<&str> = self.fields.paths().collect();
        write!(f, "validation failed for {}", paths.join(", "))
    }
}

impl std::error::Error for ValidationFailure {}

/// A failure raised by a user handler.
///
/// Handler failures keep a `name` and `message` so transports can surface
/// them, an optional HTTP status the handler attached, and optionally the
/// underlying error.
///
/// # Example
///
/// ```
/// use hermes_core::HandlerFailure;
/// use http::StatusCode;
///
/// let failure = HandlerFailure::named("NotFound", "user 7 does not exist")
///     .with_status(StatusCode::NOT_FOUND);
///
/// assert_eq!(failure.name(), "NotFound");
/// assert_eq!(failure.status_code(), StatusCode::NOT_FOUND);
///
/// let plain = HandlerFailure::new("boom");
/// assert_eq!(plain.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerFailure {
    name: String,
    message: String,
    status: Option<StatusCode>,
    #[source]
    source: Option<anyhow::Error>,
}

impl HandlerFailure {
    /// Creates a failure with the default name.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::named(DEFAULT_ERROR_NAME, message)
    }

    /// Creates a failure with an explicit error name.
    #[must_use]
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Wraps an arbitrary error. The name is the error's type name.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let name = short_type_name::<E>();
        Self {
            name: name.to_string(),
            message: error.to_string(),
            status: None,
            source: Some(anyhow::Error::new(error)),
        }
    }

    /// Attaches an HTTP status to report instead of `500`.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// The error name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The status the handler attached, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The attached status, or `500 Internal Server Error`.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Borrows the wrapped error as `E`, if that is what it is.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.source.as_ref().and_then(|s| s.downcast_ref::<E>())
    }

    /// Takes the wrapped error out as `E`, or gives the failure back.
    pub fn downcast<E>(mut self) -> Result<E, Self>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        match self.source.take() {
            Some(source) => match source.downcast::<E>() {
                Ok(inner) => Ok(inner),
                Err(source) => {
                    self.source = Some(source);
                    Err(self)
                }
            },
            None => Err(self),
        }
    }

    /// Builds the JSON error envelope (`name` and `message`).
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            name: self.name.clone(),
            message: self.message.clone(),
            fields: None,
        }
    }
}

impl From<anyhow::Error> for HandlerFailure {
    fn from(error: anyhow::Error) -> Self {
        Self {
            name: DEFAULT_ERROR_NAME.to_string(),
            message: error.to_string(),
            status: None,
            source: Some(error),
        }
    }
}

/// Either failure kind, as re-signaled to a transport's error pipeline.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Parameter binding failed.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerFailure),
}

impl DispatchError {
    /// The status the transport should respond with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(failure) => failure.status_code(),
            Self::Handler(failure) => failure.status_code(),
        }
    }

    /// The error name (`ValidateError` for validation failures).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Validation(_) => VALIDATION_ERROR_NAME,
            Self::Handler(failure) => failure.name(),
        }
    }

    /// Returns `true` for validation failures.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Builds the JSON error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        match self {
            Self::Validation(failure) => failure.to_envelope(),
            Self::Handler(failure) => failure.to_envelope(),
        }
    }
}

/// Serializable error body.
///
/// ```json
/// { "name": "ValidateError", "message": "...", "fields": { "id": { "message": "..." } } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error name.
    pub name: String,
    /// Human-readable message.
    pub message: String,
    /// Failing fields, for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
