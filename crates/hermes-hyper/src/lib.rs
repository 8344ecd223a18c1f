//! # Hermes Hyper
//!
//! Continuation-style transport for Hermes on `hyper` and `http`.
//!
//! A handler's outcome is written into a per-exchange [`ResponseSink`]; the
//! connection side awaits the matching [`PendingResponse`]. Failures are
//! handed back unchanged to the caller's error pipeline
//! ([`error_response`]).
//!
//! - [`ExchangeRequest`] - The fully read request bound to `request` parameters
//! - [`HyperTransport`] - Argument binding and response finalization
//! - [`ResponseSink`] - Exactly-once response channel
//! - [`serve`] - Read, dispatch and respond in one call
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hermes_core::{HandlerFailure, ParamSpec, Shape};
//! use hermes_dispatch::{HandlerValue, Operation};
//! use hermes_extract::{ExtractConfig, Params};
//! use hermes_hyper::{serve, HyperTransport};
//! use hyper::body::Incoming;
//! use hyper::service::service_fn;
//! use serde_json::json;
//!
//! let transport = Arc::new(HyperTransport::new());
//! let operation = Arc::new(
//!     Operation::new("echo").param(ParamSpec::body("body", Shape::any().required())),
//! );
//!
//! let service = service_fn(move |request: http::Request<Incoming>| {
//!     let transport = Arc::clone(&transport);
//!     let operation = Arc::clone(&operation);
//!     async move {
//!         let params = Params::new();
//!         let extract = ExtractConfig::default();
//!         serve(&transport, &operation, request, params, &extract, &(), |args| async move {
//!             let body = args[0].json().cloned().unwrap_or_default();
//!             Ok::<_, HandlerFailure>(HandlerValue::from(json!({ "echo": body })))
//!         })
//!         .await
//!     }
//! });
//! # let _ = service;
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-hyper/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod request;
mod serve;
mod sink;
mod transport;

pub use error::{error_response, extraction_response};
pub use request::ExchangeRequest;
pub use serve::serve;
pub use sink::{empty_body, full_body, stream_body, PendingResponse, ResponseSink, SinkBody, SinkError};
pub use transport::HyperTransport;
