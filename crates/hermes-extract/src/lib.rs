//! # Hermes Extract
//!
//! Request payload extraction shared by the Hermes transport adapters.
//!
//! Transports read the pieces of a request that parameter binding draws from:
//!
//! | Item | Source | Description |
//! |------|--------|-------------|
//! | [`Params`] | URL path | Captured path segments, supplied by the router |
//! | [`parse_query`] | Query string | Ordered mapping; repeated keys become arrays |
//! | [`read_body`] | Request body | Size-limited body collection |
//! | [`parse_payload`] | Request body | JSON, URL-encoded, multipart or text by `Content-Type` |
//!
//! Failures are reported as [`ExtractionError`], which maps to `400`, `413`
//! or `415`.

#![doc(html_root_url = "https://docs.rs/hermes-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod config;
mod error;
mod multipart;
mod params;
mod query;

pub use body::{parse_payload, read_body, Payload};
pub use config::{ExtractConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FIELDS, DEFAULT_MAX_FIELD_SIZE};
pub use error::{ExtractionError, ExtractionSource, EXTRACTION_ERROR_NAME};
pub use multipart::{read_multipart, MultipartForm};
pub use params::Params;
pub use query::{parse_form, parse_query, QueryMap};
