//! The value transport.

use std::fmt;
use std::sync::Arc;

use hermes_core::{
    DispatchError, FormKind, ParamSource, ParamSpec, ParamValue, ShapeValidator,
    ValidationConfig, Validator,
};
use hermes_dispatch::{ArgumentBinder, HandlerValue, HeaderSet, ResponseFinalizer};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Reply, ReplyError, ReplyRequest, ReplyToolkit};

/// Binds arguments from a [`ReplyRequest`] and produces a [`Reply`].
///
/// Failures are returned as [`ReplyError`]s.
#[derive(Clone)]
pub struct ReplyTransport {
    validator: Arc<dyn Validator>,
    config: Arc<ValidationConfig>,
}

impl ReplyTransport {
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

impl Default for ReplyTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReplyTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResponseFinalizer for ReplyTransport {
    type Handle = ReplyToolkit;
    type Output = Reply;
    type Error = ReplyError;

    fn finalize(
        &self,
        toolkit: &ReplyToolkit,
        headers: HeaderSet,
        status: Option<StatusCode>,
        data: HandlerValue,
    ) -> Reply {
        if let Some(reply) = toolkit.responded() {
            debug!("exchange already finalized, returning stored reply");
            return reply;
        }
        toolkit.respond_with(|| build_reply(headers, status, data))
    }

    fn reject(&self, error: DispatchError) -> ReplyError {
        ReplyError::from(error)
    }
}

impl ArgumentBinder for ReplyTransport {
    type Request = ReplyRequest;

    fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    fn validation_config(&self) -> &ValidationConfig {
        &self.config
    }

    fn resolve(&self, spec: &ParamSpec, request: &ReplyRequest) -> Option<ParamValue> {
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
                .map(|v| ParamValue::Json(Value::String(v.to_string()))),
            ParamSource::Body => Some(ParamValue::Json(request.payload().clone())),
            ParamSource::BodyField | ParamSource::FormData(FormKind::Field) => {
                request.payload().get(name).cloned().map(ParamValue::Json)
            }
            ParamSource::FormData(FormKind::File) => {
                request.uploads(name).first().cloned().map(ParamValue::File)
            }
            ParamSource::FormData(FormKind::Files) => {
                let files = request.uploads(name);
                (!files.is_empty()).then(|| ParamValue::Files(files.to_vec()))
            }
            ParamSource::Request | ParamSource::Responder | ParamSource::Unrecognized(_) => None,
        }
    }
}

fn build_reply(headers: HeaderSet, status: Option<StatusCode>, data: HandlerValue) -> Reply {
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
            _ => warn!(header = %name, "skipping invalid reply header"),
        }
    }

    let reply = match data {
        HandlerValue::Stream(stream) => {
            Reply::stream(status.unwrap_or(StatusCode::OK), map, stream)
        }
        HandlerValue::Json(value) => {
            if !map.contains_key(CONTENT_TYPE) {
                map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Reply::json(status.unwrap_or(StatusCode::OK), map, value)
        }
        HandlerValue::Empty => Reply::empty(status.unwrap_or(StatusCode::NO_CONTENT), map),
    };
    debug!(status = reply.status().as_u16(), "reply assembled");
    reply
}
