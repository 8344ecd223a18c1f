//! # Hermes
//!
//! **Framework-agnostic request dispatch for operation handlers**
//!
//! Hermes sits between an HTTP framework and plain async handlers. For each
//! exchange it binds handler arguments from declared parameter sources,
//! validates them all before reporting any failure, calls the handler, and
//! finalizes the response exactly once, whether the handler returns a value,
//! fails, or answers through an injected [`Responder`](prelude::Responder).
//!
//! Two transports ship with it:
//!
//! - [`hyper`] hands the response to a sink (continuation style).
//! - [`reply`] returns the response as a value.
//!
//! ## Quick Start
//!
//! ```rust
//! use hermes::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let operation = Operation::new("getUser")
//!     .param(ParamSpec::path("id", Shape::integer().required()));
//! let request = ReplyRequest::new(http::Method::GET, "/users/7").with_param("id", "7");
//!
//! let reply = handle(&ReplyTransport::new(), &operation, &request, &(), |args| async move {
//!     let id = args[0].json().cloned().unwrap_or_default();
//!     Ok::<_, HandlerFailure>(HandlerValue::from(json!({ "id": id })))
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(reply.json_payload(), Some(&json!({ "id": 7 })));
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! request → ArgumentBinder (collect every field error) → handler
//!                                                          ↓
//! response ← ResponseFinalizer (first finalization wins) ←─┘
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use hermes_core as core;

// Re-export extraction types
pub use hermes_extract as extract;

// Re-export the dispatch protocol
pub use hermes_dispatch as dispatch;

// Re-export the continuation transport
pub use hermes_hyper as hyper;

// Re-export the value transport
pub use hermes_reply as reply;

// Re-export logging setup
pub use hermes_telemetry as telemetry;

// Re-export configuration
pub use hermes_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hermes::prelude::*;
///
/// let operation = Operation::new("ping");
/// assert_eq!(operation.id, "ping");
/// ```
pub mod prelude {
    pub use hermes_core::{
        AdditionalProperties, DispatchError, FieldErrors, HandlerFailure, ParamSpec, ParamValue,
        Shape, ShapeValidator, UploadedFile, ValidationConfig, ValidationFailure, Validator,
    };

    // Re-export the dispatch protocol
    pub use hermes_dispatch::{
        dispatch, Argument, ArgumentBinder, Controller, ControllerState, HandlerReceiver,
        HandlerValue, HeaderSet, Operation, Responder, ResponseFinalizer,
    };

    // Re-export extraction types
    pub use hermes_extract::{ExtractConfig, ExtractionError, Params};

    // Re-export the transports
    pub use hermes_hyper::{serve, ExchangeRequest, HyperTransport, ResponseSink};
    pub use hermes_reply::{handle, into_http, Reply, ReplyError, ReplyRequest, ReplyTransport};

    // Re-export setup
    pub use hermes_config::{ConfigLoader, HermesConfig};
    pub use hermes_telemetry::{init_logging, LogConfig};
}
