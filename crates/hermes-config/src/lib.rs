//! Layered configuration for Hermes.
//!
//! [`HermesConfig`] gathers the options of the validator, the body
//! extractor and logging. [`ConfigLoader`] builds one from defaults, a
//! TOML or JSON file, and environment variables.
//!
//! # Configuration File Format
//!
//! ```toml
//! [validation]
//! no_implicit_additional_properties = "throw-on-extras"
//! body_coercion = true
//!
//! [extract]
//! max_body_size = 2097152
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variables
//!
//! With `with_env_prefix("HERMES")`, keys are `HERMES__<SECTION>__<KEY>`,
//! for example `HERMES__VALIDATION__BODY_COERCION=false` or
//! `HERMES__LOGGING__FORMAT=pretty`.

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::HermesConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
