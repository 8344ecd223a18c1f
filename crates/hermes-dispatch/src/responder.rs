//! First-class responder capability.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use crate::{HandlerValue, HeaderSet};

type RespondFn = dyn Fn(Option<StatusCode>, HandlerValue, HeaderSet) + Send + Sync;

/// A callback that finalizes one exchange.
///
/// Handlers receive a `Responder` for parameters declared with source `res`.
/// Calling [`respond`](Self::respond) finalizes the exchange exactly as if
/// the handler had returned the value; whichever happens first wins.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use hermes_dispatch::{HandlerValue, HeaderSet, Responder};
/// use http::StatusCode;
///
/// let seen = Arc::new(Mutex::new(None));
/// let sink = Arc::clone(&seen);
/// let responder = Responder::new(move |status, _data, _headers| {
///     *sink.lock().unwrap() = status;
/// });
///
/// responder.respond(StatusCode::NOT_FOUND, HandlerValue::Empty, HeaderSet::new());
/// assert_eq!(*seen.lock().unwrap(), Some(StatusCode::NOT_FOUND));
/// ```
#[derive(Clone)]
pub struct Responder {
    respond: Arc<RespondFn>,
}

impl Responder {
    /// Wraps a finalization callback.
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(Option<StatusCode>, HandlerValue, HeaderSet) + Send + Sync + 'static,
    {
        Self {
            respond: Arc::new(respond),
        }
    }

    /// Finalizes the exchange with `status`, `data` and `headers`.
    pub fn respond(
        &self,
        status: impl Into<Option<StatusCode>>,
        data: impl Into<HandlerValue>,
        headers: HeaderSet,
    ) {
        (self.respond)(status.into(), data.into(), headers);
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder").finish_non_exhaustive()
    }
}
