//! Payload size limits.

use serde::{Deserialize, Serialize};

/// Default maximum body size (50 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum size of one multipart field (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum number of multipart fields.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Limits applied while reading and parsing a request payload.
///
/// # Example
///
/// ```rust
/// use hermes_extract::ExtractConfig;
///
/// let config = ExtractConfig::new().max_body_size(1024).max_fields(4);
/// assert_eq!(config.max_body_size, 1024);
/// assert_eq!(config.max_fields, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Maximum total body size in bytes.
    pub max_body_size: usize,
    /// Maximum size of one multipart field in bytes.
    pub max_field_size: usize,
    /// Maximum number of multipart fields.
    pub max_fields: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl ExtractConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Sets the maximum field size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Sets the maximum number of fields.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}
