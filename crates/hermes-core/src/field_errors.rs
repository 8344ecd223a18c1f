//! Field-level validation error aggregation.
//!
//! [`FieldErrors`] is the sink every parameter validation writes into while a
//! request is being bound. Binding never stops at the first failure: all
//! parameters are attempted, then [`FieldErrors::raise`] turns a non-empty set
//! into a single [`ValidationFailure`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValidationFailure;

/// A single field validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Human-readable description of the failure.
    pub message: String,
    /// The offending value, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Ordered set of field errors for one request.
///
/// Keys are dotted field paths (`id`, `body.email`, `tags.$1`). Keys are
/// unique; iteration order is the order in which fields were first recorded.
///
/// # Example
///
/// ```
/// use hermes_core::FieldErrors;
/// use serde_json::json;
///
/// let mut errors = FieldErrors::new();
/// assert!(errors.raise("").is_ok());
///
/// errors.record("id", "invalid integer number", Some(json!("abc")));
/// errors.record("body.email", "'email' is required", None);
///
/// let failure = errors.raise("request validation failed").unwrap_err();
/// assert_eq!(failure.fields().len(), 2);
/// assert_eq!(failure.message(), "request validation failed");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    fields: IndexMap<String, FieldError>,
}

impl FieldErrors {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`.
    ///
    /// Recording the same path twice keeps the first position and replaces
    /// the entry.
    pub fn record(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<Value>,
    ) {
        self.fields.insert(
            field.into(),
            FieldError {
                message: message.into(),
                value,
            },
        );
    }

    /// Returns `true` if at least one failure was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Returns `true` if no failure was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Looks up the failure recorded for a field path.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.fields.get(field)
    }

    /// Returns `true` if a failure was recorded for the field path.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over `(path, error)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field paths in discovery order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Appends every entry of `other`, preserving its order.
    pub fn merge(&mut self, other: FieldErrors) {
        self.fields.extend(other.fields);
    }

    /// Fails with a [`ValidationFailure`] carrying every recorded entry.
    ///
    /// Returns `Ok(())` when the set is empty and leaves the set untouched.
    /// Otherwise the entries move into the returned failure.
    pub fn raise(&mut self, message: impl Into<String>) -> Result<(), ValidationFailure> {
        if self.is_empty() {
            return Ok(());
        }
        Err(ValidationFailure::new(std::mem::take(self), message))
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = (&'a String, &'a FieldError);
    type IntoIter = indexmap::map::Iter<'a, String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_empty_set_never_raises() {
        let mut errors = FieldErrors::new();
        assert!(!errors.has_errors());
        assert!(errors.raise("anything").is_ok());
    }

    #[test]
    fn test_record_and_raise() {
        let mut errors = FieldErrors::new();
        errors.record("id", "invalid integer number", Some(json!("abc")));

        assert!(errors.has_errors());
        let failure = errors.raise("").unwrap_err();

        let entry = failure.fields().get("id").unwrap();
        assert_eq!(entry.message, "invalid integer number");
        assert_eq!(entry.value, Some(json!("abc")));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_discovery_order_is_kept() {
        let mut errors = FieldErrors::new();
        errors.record("zeta", "a", None);
        errors.record("alpha", "b", None);
        errors.record("body.mid", "c", None);

        let paths: Vec<_> = errors.paths().collect();
        assert_eq!(paths, vec!["zeta", "alpha", "body.mid"]);
    }

    #[test]
    fn test_rerecord_keeps_position() {
        let mut errors = FieldErrors::new();
        errors.record("a", "first", None);
        errors.record("b", "second", None);
        errors.record("a", "replaced", None);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.paths().next(), Some("a"));
        assert_eq!(errors.get("a").unwrap().message, "replaced");
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let mut errors = FieldErrors::new();
        errors.record("id", "invalid integer number", Some(json!("x")));
        errors.record("name", "'name' is required", None);

        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(
            json,
            r#"{"id":{"message":"invalid integer number","value":"x"},"name":{"message":"'name' is required"}}"#
        );
    }

    #[test]
    fn test_merge() {
        let mut a = FieldErrors::new();
        a.record("x", "1", None);
        let mut b = FieldErrors::new();
        b.record("y", "2", None);

        a.merge(b);
        assert_eq!(a.paths().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    proptest! {
        #[test]
        fn prop_paths_follow_first_discovery(keys in prop::collection::vec("[a-d]{1,2}", 0..24)) {
            let mut errors = FieldErrors::new();
            for key in &keys {
                errors.record(key.as_str(), "bad", None);
            }

            let mut expected: Vec<&str> = Vec::new();
            for key in &keys {
                if !expected.contains(&key.as_str()) {
                    expected.push(key.as_str());
                }
            }
            prop_assert_eq!(errors.paths().collect::<Vec<_>>(), expected.clone());
            prop_assert_eq!(errors.len(), expected.len());
        }
    }
}
