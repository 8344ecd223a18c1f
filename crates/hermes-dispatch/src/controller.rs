//! Controller capability detection.
//!
//! A handler's receiver may carry out-of-band response state: a status and
//! headers the handler set while running. Receivers opt in by implementing
//! [`HandlerReceiver::as_controller`]; [`inspect`] turns that into a tagged
//! [`Receiver`] the finalizer matches on.
//!
//! # Example
//!
//! ```rust
//! use hermes_dispatch::{inspect, Controller, ControllerState, Receiver};
//! use http::StatusCode;
//!
//! let state = ControllerState::new();
//! state.set_status(StatusCode::CREATED);
//! state.set_header("location", Some("/users/7".into()));
//!
//! match inspect(&state) {
//!     Receiver::Controller(controller) => {
//!         assert_eq!(controller.status(), Some(StatusCode::CREATED));
//!         assert_eq!(controller.headers()["location"], "/users/7");
//!     }
//!     Receiver::Plain => unreachable!(),
//! }
//!
//! assert!(matches!(inspect(&()), Receiver::Plain));
//! ```

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Response headers set out of band, in the order they were first set.
pub type HeaderSet = IndexMap<String, String>;

/// Out-of-band response state a handler can set.
pub trait Controller: Send + Sync {
    /// Headers to apply to the response.
    fn headers(&self) -> HeaderSet;

    /// Status to respond with, if the handler chose one.
    fn status(&self) -> Option<StatusCode>;

    /// Chooses the response status.
    fn set_status(&self, status: StatusCode);

    /// Sets a response header, or removes it when `value` is `None`.
    fn set_header(&self, name: &str, value: Option<String>);
}

/// Stock [`Controller`] implementation for handlers to embed.
#[derive(Debug, Default)]
pub struct ControllerState {
    inner: Mutex<ControllerInner>,
}

#[derive(Debug, Default)]
struct ControllerInner {
    status: Option<StatusCode>,
    headers: HeaderSet,
}

impl ControllerState {
    /// Creates empty state: no status, no headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Controller for ControllerState {
    fn headers(&self) -> HeaderSet {
        self.inner.lock().headers.clone()
    }

    fn status(&self) -> Option<StatusCode> {
        self.inner.lock().status
    }

    fn set_status(&self, status: StatusCode) {
        self.inner.lock().status = Some(status);
    }

    fn set_header(&self, name: &str, value: Option<String>) {
        let mut inner = self.inner.lock();
        match value {
            Some(value) => {
                inner.headers.insert(name.to_string(), value);
            }
            None => {
                inner.headers.shift_remove(name);
            }
        }
    }
}

/// The object a handler is invoked on.
///
/// The default implementation reports no controller capability.
pub trait HandlerReceiver: Send + Sync {
    /// Returns the receiver's controller state, if it has one.
    fn as_controller(&self) -> Option<&dyn Controller> {
        None
    }
}

impl HandlerReceiver for () {}

impl HandlerReceiver for ControllerState {
    fn as_controller(&self) -> Option<&dyn Controller> {
        Some(self)
    }
}

impl<T: HandlerReceiver + ?Sized> HandlerReceiver for Arc<T> {
    fn as_controller(&self) -> Option<&dyn Controller> {
        (**self).as_controller()
    }
}

impl<T: HandlerReceiver + ?Sized> HandlerReceiver for &T {
    fn as_controller(&self) -> Option<&dyn Controller> {
        (**self).as_controller()
    }
}

/// Result of controller detection.
#[derive(Clone, Copy)]
pub enum Receiver<'a> {
    /// The receiver exposes controller state.
    Controller(&'a dyn Controller),
    /// The receiver has no controller state.
    Plain,
}

impl Receiver<'_> {
    /// Headers and status to finalize with. Plain receivers contribute none.
    #[must_use]
    pub fn response_state(&self) -> (HeaderSet, Option<StatusCode>) {
        match self {
            Self::Controller(controller) => (controller.headers(), controller.status()),
            Self::Plain => (HeaderSet::new(), None),
        }
    }
}

impl fmt::Debug for Receiver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controller(controller) => f
                .debug_struct("Controller")
                .field("status", &controller.status())
                .field("headers", &controller.headers())
                .finish(),
            Self::Plain => f.write_str("Plain"),
        }
    }
}

/// Detects whether `receiver` has the controller capability.
pub fn inspect<R: HandlerReceiver + ?Sized>(receiver: &R) -> Receiver<'_> {
    match receiver.as_controller() {
        Some(controller) => Receiver::Controller(controller),
        None => Receiver::Plain,
    }
}
