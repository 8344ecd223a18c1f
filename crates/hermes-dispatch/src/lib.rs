//! # Hermes Dispatch
//!
//! Transport-neutral request dispatch: argument binding with
//! collect-then-fail validation, and exactly-once response finalization.
//!
//! - [`ArgumentBinder`] - Binds ordered handler arguments from a transport request
//! - [`ResponseFinalizer`] - Produces exactly one response per exchange
//! - [`Responder`] - Callback that finalizes like a returned value
//! - [`ResponseState`] - Per-exchange "already responded" marker
//! - [`Controller`] / [`HandlerReceiver`] / [`inspect`] - Controller capability detection
//! - [`HandlerValue`] - Empty, JSON or byte-stream handler results
//! - [`Operation`] / [`dispatch`] - The call site tying the pieces together
//!
//! Transports (`hermes-hyper`, `hermes-reply`) implement `resolve`,
//! `finalize` and `reject`; everything else is shared.

#![doc(html_root_url = "https://docs.rs/hermes-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod controller;
mod dispatch;
mod finalizer;
mod operation;
mod responder;
mod state;
mod value;

pub use binder::{Argument, ArgumentBinder};
pub use controller::{inspect, Controller, ControllerState, HandlerReceiver, HeaderSet, Receiver};
pub use dispatch::dispatch;
pub use finalizer::ResponseFinalizer;
pub use operation::Operation;
pub use responder::Responder;
pub use state::ResponseState;
pub use value::{BoxError, ByteStream, HandlerValue};
