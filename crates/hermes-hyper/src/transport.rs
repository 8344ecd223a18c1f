//! The continuation transport.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use hermes_core::{
    DispatchError, FormKind, ParamSource, ParamSpec, ParamValue, ShapeValidator, UploadedFile,
    ValidationConfig, Validator,
};
use hermes_dispatch::{ArgumentBinder, HandlerValue, HeaderSet, ResponseFinalizer};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::sink::{empty_body, full_body, stream_body, SinkBody, SinkError};
use crate::{ExchangeRequest, ResponseSink};

/// Binds arguments from an [`ExchangeRequest`] and writes responses into a
/// [`ResponseSink`].
///
/// Handler failures are handed back unchanged as [`DispatchError`]s for the
/// caller's error pipeline (see [`error_response`](crate::error_response)).
///
/// # Example
///
/// ```rust
/// use hermes_core::{AdditionalProperties, ValidationConfig};
/// use hermes_hyper::HyperTransport;
///
/// let transport = HyperTransport::new().with_validation_config(
///     ValidationConfig::default()
///         .with_additional_properties(AdditionalProperties::ThrowOnExtras),
/// );
/// # let _ = transport;
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    validator: Arc<dyn Validator>,
    config: Arc<ValidationConfig>,
}

impl HyperTransport {
    /// Creates a transport using [`ShapeValidator`] and default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: Arc::new(ShapeValidator::new()),
            config: Arc::new(ValidationConfig::default()),
        }
    }

    /// Replaces the validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replaces the validation options.
    #[must_use]
    pub fn with_validation_config(mut self, config: ValidationConfig) -> Self {
        self.config = Arc::new(config);
        self
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResponseFinalizer for HyperTransport {
    type Handle = ResponseSink;
    type Output = ();
    type Error = DispatchError;

    fn finalize(
        &self,
        sink: &ResponseSink,
        headers: HeaderSet,
        status: Option<StatusCode>,
        data: HandlerValue,
    ) {
        if sink.is_finalized() {
            debug!("exchange already finalized, ignoring response");
            return;
        }
        match sink.send(build_response(headers, status, data)) {
            Ok(()) => {}
            Err(SinkError::AlreadyFinalized) => {
                debug!("exchange already finalized, ignoring response");
            }
            Err(SinkError::Closed) => {
                debug!("response channel closed, client went away");
            }
        }
    }

    fn reject(&self, error: DispatchError) -> DispatchError {
        error
    }
}

impl ArgumentBinder for HyperTransport {
    type Request = ExchangeRequest;

    fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    fn validation_config(&self) -> &ValidationConfig {
        &self.config
    }

    fn resolve(&self, spec: &ParamSpec, request: &ExchangeRequest) -> Option<ParamValue> {
        let name = spec.name.as_str();
        match &spec.source {
            ParamSource::Path => request
                .params()
                .get(name)
                .map(|v| ParamValue::Json(Value::String(v.to_string()))),
            ParamSource::Query => request.query().get(name).cloned().map(ParamValue::Json),
            ParamSource::Queries => Some(ParamValue::Json(Value::Object(request.query().clone()))),
            ParamSource::Header => request
                .header(name)
                .map(|v| ParamValue::Json(Value::String(v))),
            ParamSource::Body => Some(ParamValue::Json(request.body().clone())),
            ParamSource::BodyField | ParamSource::FormData(FormKind::Field) => {
                request.body().get(name).cloned().map(ParamValue::Json)
            }
            ParamSource::FormData(FormKind::File) => {
                request.uploads(name).next().cloned().map(ParamValue::File)
            }
            ParamSource::FormData(FormKind::Files) => {
                let files: Vec<UploadedFile> = request.uploads(name).cloned().collect();
                (!files.is_empty()).then_some(ParamValue::Files(files))
            }
            ParamSource::Request | ParamSource::Responder | ParamSource::Unrecognized(_) => None,
        }
    }
}

/// Assembles a complete response.
///
/// Invalid header names or values are skipped with a warning. JSON bodies
/// get `content-type: application/json` unless a content type was set.
pub(crate) fn build_response(
    headers: HeaderSet,
    status: Option<StatusCode>,
    data: HandlerValue,
) -> Response<SinkBody> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(header), Ok(value)) => {
                if map.insert(header, value).is_some() {
                    debug!(header = %name, "header name set twice, keeping the last value");
                }
            }
            _ => warn!(header = %name, "skipping invalid response header"),
        }
    }

    let (status, body) = match data {
        HandlerValue::Stream(stream) => (status.unwrap_or(StatusCode::OK), stream_body(stream)),
        HandlerValue::Json(value) => {
            if !map.contains_key(CONTENT_TYPE) {
                map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            (
                status.unwrap_or(StatusCode::OK),
                full_body(Bytes::from(value.to_string())),
            )
        }
        HandlerValue::Empty => (status.unwrap_or(StatusCode::NO_CONTENT), empty_body()),
    };

    debug!(status = status.as_u16(), "response assembled");
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = map;
    response
}
