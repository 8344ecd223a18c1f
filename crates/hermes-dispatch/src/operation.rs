//! Operation descriptions from the route table.

use hermes_core::ParamSpec;
use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One routable operation: its parameters and declared success status.
///
/// # Example
///
/// ```rust
/// use hermes_dispatch::Operation;
/// use hermes_core::{ParamSource, ParamSpec, Shape};
/// use http::StatusCode;
///
/// let op: Operation = serde_json::from_str(r#"{
///     "id": "createUser",
///     "successStatus": 201,
///     "params": {
///         "body": { "name": "body", "in": "body", "dataType": "any", "required": true },
///         "res": { "name": "res", "in": "res" }
///     }
/// }"#).unwrap();
///
/// assert_eq!(op.success_status, Some(StatusCode::CREATED));
/// assert_eq!(op.params["res"].source, ParamSource::Responder);
///
/// let built = Operation::new("getUser").param(ParamSpec::path("id", Shape::integer().required()));
/// assert_eq!(built.success_status, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation identifier.
    pub id: String,

    /// Parameters in declared order, keyed by argument name.
    #[serde(default)]
    pub params: IndexMap<String, ParamSpec>,

    /// Declared success status. When absent the finalizer's defaults apply.
    #[serde(default, with = "status_code", skip_serializing_if = "Option::is_none")]
    pub success_status: Option<StatusCode>,
}

impl Operation {
    /// Creates an operation with no parameters.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: IndexMap::new(),
            success_status: None,
        }
    }

    /// Appends a parameter, keyed by its name.
    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.insert(spec.name.clone(), spec);
        self
    }

    /// Declares the success status.
    #[must_use]
    pub fn success_status(mut self, status: StatusCode) -> Self {
        self.success_status = Some(status);
        self
    }
}

mod status_code {
    use http::StatusCode;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        status: &Option<StatusCode>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match status {
            Some(status) => serializer.serialize_some(&status.as_u16()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<StatusCode>, D::Error> {
        Option::<u16>::deserialize(deserializer)?
            .map(|code| StatusCode::from_u16(code).map_err(de::Error::custom))
            .transpose()
    }
}
