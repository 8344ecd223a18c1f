//! # Hermes Reply
//!
//! Value-style transport for Hermes: a handler's outcome is turned into a
//! [`Reply`] the caller returns, and failures into a [`ReplyError`].
//!
//! Each exchange gets a [`ReplyToolkit`] holding its reply once produced.
//! Finalizing again, whether through a responder or the returned value,
//! yields the stored reply instead of building a new one.
//!
//! - [`ReplyRequest`] - Request with path params, query, lowercased headers,
//!   payload and uploads by field
//! - [`ReplyTransport`] - Argument binding and reply finalization
//! - [`ReplyError`] - Structured error with status and `{name, message}` payload
//! - [`handle`] / [`into_http`] - Dispatch in one call, convert to `http::Response`

#![doc(html_root_url = "https://docs.rs/hermes-reply/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handle;
mod reply;
mod request;
mod transport;

pub use error::ReplyError;
pub use handle::{handle, into_http};
pub use reply::{Reply, ReplyBody, ReplyToolkit};
pub use request::ReplyRequest;
pub use transport::ReplyTransport;
