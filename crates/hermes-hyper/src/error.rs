//! The error pipeline: failures turned into JSON error responses.

use bytes::Bytes;
use hermes_core::{DispatchError, ErrorEnvelope};
use hermes_extract::ExtractionError;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use tracing::{debug, error};

use crate::sink::{full_body, SinkBody};

/// Builds the response for a dispatch failure.
///
/// Validation failures become `400` with every failing field listed. Handler
/// failures use their own status, or `500`. Server errors are logged at
/// `error` level.
///
/// # Example
///
/// ```rust
/// use hermes_core::{DispatchError, HandlerFailure};
/// use http::StatusCode;
///
/// let failure: DispatchError = HandlerFailure::named("NotFound", "no such user")
///     .with_status(StatusCode::NOT_FOUND)
///     .into();
///
/// let response = hermes_hyper::error_response(&failure);
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// ```
#[must_use]
pub fn error_response(error: &DispatchError) -> Response<SinkBody> {
    let status = error.status_code();
    if status.is_server_error() {
        error!(name = error.name(), error = %error, "request failed");
    } else {
        debug!(name = error.name(), status = status.as_u16(), "request rejected");
    }
    json_error(status, &error.to_envelope())
}

/// Builds the response for a request whose payload could not be read.
#[must_use]
pub fn extraction_response(error: &ExtractionError) -> Response<SinkBody> {
    debug!(code = error.error_code(), error = %error, "payload extraction failed");
    json_error(error.status_code(), &error.to_envelope())
}

fn json_error(status: StatusCode, envelope: &ErrorEnvelope) -> Response<SinkBody> {
    let body = serde_json::to_vec(envelope).unwrap_or_default();
    let mut response = Response::new(full_body(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{FieldErrors, HandlerFailure, ValidationFailure};
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(response: Response<SinkBody>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_failure_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.record("id", "invalid integer number", Some("abc".into()));
        let error: DispatchError = ValidationFailure::new(fields, "").into();

        let response = error_response(&error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = body_json(response).await;
        assert_eq!(body["name"], "ValidateError");
        assert_eq!(body["fields"]["id"]["message"], "invalid integer number");
    }

    #[tokio::test]
    async fn test_handler_failure_defaults_to_500() {
        let error: DispatchError = HandlerFailure::new("boom").into();

        let response = error_response(&error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["name"], "Error");
        assert_eq!(body["message"], "boom");
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn test_extraction_failure_status() {
        let response = extraction_response(&ExtractionError::payload_too_large(10));
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
