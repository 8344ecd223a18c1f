//! # Hermes Core
//!
//! Core types shared by every Hermes transport adapter.
//!
//! - [`ParamSpec`] / [`ParamSource`] / [`Shape`] - Declarative parameter descriptions
//! - [`FieldErrors`] - Ordered per-request validation error sink
//! - [`Validator`] / [`ShapeValidator`] - Pluggable value validation
//! - [`ValidationFailure`] / [`HandlerFailure`] / [`DispatchError`] - Failure kinds
//! - [`ParamValue`] / [`UploadedFile`] - Raw and validated parameter values

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod field_errors;
mod param;
mod shape;
mod validation;
mod validator;
mod value;

pub use error::{
    DispatchError, DispatchResult, ErrorEnvelope, HandlerFailure, ValidationFailure,
    DEFAULT_ERROR_NAME, VALIDATION_ERROR_NAME,
};
pub use field_errors::{FieldError, FieldErrors};
pub use param::{FormKind, ParamSource, ParamSpec};
pub use shape::{DataType, Rule, Shape, Validators};
pub use validation::{AdditionalProperties, ValidationConfig, Validator};
pub use validator::ShapeValidator;
pub use value::{ParamValue, UploadedFile};
