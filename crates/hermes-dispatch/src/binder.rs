//! Argument binding.
//!
//! [`ArgumentBinder::bind_arguments`] walks an operation's parameters in
//! declared order, resolves each raw value through the transport and
//! validates it. Every parameter is attempted; failures are collected and
//! raised together once the walk is done.

use hermes_core::{
    FieldErrors, ParamSource, ParamSpec, ParamValue, ValidationConfig, ValidationFailure,
    Validator,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ResponseFinalizer, Responder};

/// One positional handler argument.
#[derive(Debug, Clone)]
pub enum Argument<R> {
    /// A validated value. `None` when an optional parameter was absent.
    Value(Option<ParamValue>),
    /// The transport's raw request handle.
    Request(R),
    /// A responder bound to this exchange.
    Responder(Responder),
    /// The parameter's source is not known to this runtime.
    Unbound,
}

impl<R> Argument<R> {
    /// Borrows the validated value.
    #[must_use]
    pub fn value(&self) -> Option<&ParamValue> {
        match self {
            Self::Value(value) => value.as_ref(),
            _ => None,
        }
    }

    /// Consumes into the validated value.
    #[must_use]
    pub fn into_value(self) -> Option<ParamValue> {
        match self {
            Self::Value(value) => value,
            _ => None,
        }
    }

    /// Borrows the validated value as JSON.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        self.value().and_then(ParamValue::as_json)
    }

    /// Borrows the bound request handle.
    #[must_use]
    pub fn request(&self) -> Option<&R> {
        match self {
            Self::Request(request) => Some(request),
            _ => None,
        }
    }

    /// Borrows the bound responder.
    #[must_use]
    pub fn responder(&self) -> Option<&Responder> {
        match self {
            Self::Responder(responder) => Some(responder),
            _ => None,
        }
    }

    /// Returns `true` for [`Argument::Unbound`].
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound)
    }
}

/// Binds handler arguments from a transport request.
///
/// Transports implement [`resolve`](Self::resolve) to read a raw value for
/// a parameter from their request type. Validation and aggregation are
/// shared.
pub trait ArgumentBinder: ResponseFinalizer {
    /// The transport's request handle.
    type Request: Clone + Send + Sync;

    /// The validator applied to every resolved value.
    fn validator(&self) -> &dyn Validator;

    /// Options passed to the validator.
    fn validation_config(&self) -> &ValidationConfig;

    /// Reads the raw value for `spec` from `request`.
    ///
    /// Only called for value sources (path, query, queries, header, body,
    /// body field and form data). `None` means absent.
    fn resolve(&self, spec: &ParamSpec, request: &Self::Request) -> Option<ParamValue>;

    /// Binds one argument per parameter, in declared order.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] carrying every failing field when at
    /// least one parameter did not validate. No arguments are returned then.
    fn bind_arguments(
        &self,
        specs: &IndexMap<String, ParamSpec>,
        request: &Self::Request,
        handle: &Self::Handle,
    ) -> Result<Vec<Argument<Self::Request>>, ValidationFailure> {
        let mut errors = FieldErrors::new();
        let mut arguments = Vec::with_capacity(specs.len());

        for spec in specs.values() {
            let argument = match &spec.source {
                ParamSource::Request => Argument::Request(request.clone()),
                ParamSource::Responder => Argument::Responder(self.make_responder(handle)),
                ParamSource::Unrecognized(tag) => {
                    warn!(param = %spec.name, source = %tag, "unrecognized parameter source, leaving argument unbound");
                    Argument::Unbound
                }
                source => {
                    let raw = self.resolve(spec, request);
                    Argument::Value(self.validator().validate_param(
                        spec,
                        raw,
                        &spec.name,
                        &mut errors,
                        source.error_prefix(),
                        self.validation_config(),
                    ))
                }
            };
            arguments.push(argument);
        }

        if errors.has_errors() {
            debug!(failed = errors.len(), "argument validation failed");
        }
        errors.raise("")?;
        Ok(arguments)
    }
}
