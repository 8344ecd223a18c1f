//! The value transport's native error convention.

use hermes_core::{
    DispatchError, ErrorEnvelope, FieldErrors, HandlerFailure, ValidationFailure,
    VALIDATION_ERROR_NAME,
};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use thiserror::Error;
use tracing::error;

use crate::reply::{full_body, ReplyBody};

/// A structured HTTP error: a status and a `{name, message, fields?}`
/// payload.
///
/// Handlers can fail with a `ReplyError` directly (it converts into a
/// [`HandlerFailure`]); the transport hands it back unchanged. Any other
/// failure is translated into one.
///
/// # Example
///
/// ```rust
/// use hermes_core::HandlerFailure;
/// use hermes_reply::ReplyError;
/// use http::StatusCode;
///
/// let err = ReplyError::new(StatusCode::CONFLICT, "Conflict", "email taken");
/// assert_eq!(err.status(), StatusCode::CONFLICT);
/// assert_eq!(err.payload().message, "email taken");
///
/// let failure: HandlerFailure = err.into();
/// assert_eq!(failure.status_code(), StatusCode::CONFLICT);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ReplyError {
    status: StatusCode,
    name: String,
    message: String,
    fields: Option<FieldErrors>,
}

impl ReplyError {
    /// Creates an error with a status, a name and a message.
    #[must_use]
    pub fn new(status: StatusCode, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            name: name.into(),
            message: message.into(),
            fields: None,
        }
    }

    /// A `400 Bad Request` error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    /// A `404 Not Found` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", message)
    }

    /// A `500 Internal Server Error`.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", message)
    }

    /// Translates a validation failure: `400`, listing every failing field.
    #[must_use]
    pub fn from_validation(failure: ValidationFailure) -> Self {
        let message = failure.to_string();
        Self {
            status: failure.status_code(),
            name: VALIDATION_ERROR_NAME.to_string(),
            message,
            fields: Some(failure.into_fields()),
        }
    }

    /// Translates a handler failure.
    ///
    /// A `ReplyError` the handler raised is returned as is. Anything else
    /// keeps its name and message, with the failure's status or `500`.
    #[must_use]
    pub fn from_failure(failure: HandlerFailure) -> Self {
        match failure.downcast::<Self>() {
            Ok(native) => native,
            Err(failure) => Self::new(failure.status_code(), failure.name(), failure.message()),
        }
    }

    /// The response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
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

    /// The failing fields of a validation error.
    #[must_use]
    pub fn fields(&self) -> Option<&FieldErrors> {
        self.fields.as_ref()
    }

    /// The response payload.
    #[must_use]
    pub fn payload(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            name: self.name.clone(),
            message: self.message.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Converts into a JSON error response.
    #[must_use]
    pub fn into_response(self) -> Response<ReplyBody> {
        let body = serde_json::to_vec(&self.payload()).unwrap_or_default();
        let mut response = Response::new(full_body(body));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

impl From<DispatchError> for ReplyError {
    fn from(error: DispatchError) -> Self {
        let translated = match error {
            DispatchError::Validation(failure) => Self::from_validation(failure),
            DispatchError::Handler(failure) => Self::from_failure(failure),
        };
        if translated.status.is_server_error() {
            error!(name = %translated.name, error = %translated.message, "request failed");
        }
        translated
    }
}

impl From<ReplyError> for HandlerFailure {
    fn from(error: ReplyError) -> Self {
        let status = error.status;
        HandlerFailure::from_error(error).with_status(status)
    }
}
