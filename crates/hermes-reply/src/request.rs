//! The request handle of the value transport.

use std::sync::Arc;

use hermes_core::UploadedFile;
use hermes_extract::{
    parse_payload, parse_query, read_body, ExtractConfig, ExtractionError, Params, QueryMap,
};
use http::Method;
use http_body::Body;
use indexmap::IndexMap;
use serde_json::Value;

/// A request as the value transport sees it.
///
/// Header names are stored lowercased. Uploaded files are kept apart from
/// the payload, grouped by form field name.
///
/// # Example
///
/// ```rust
/// use hermes_reply::ReplyRequest;
/// use serde_json::json;
///
/// let request = ReplyRequest::new(http::Method::POST, "/users/7")
///     .with_param("id", "7")
///     .with_header("X-Tenant", "acme")
///     .with_payload(json!({ "name": "ada" }));
///
/// assert_eq!(request.params().get("id"), Some("7"));
/// assert_eq!(request.header("x-tenant"), Some("acme"));
/// assert_eq!(request.payload()["name"], "ada");
/// ```
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    inner: Arc<Inner>,
}

#[derive(Debug, Clone)]
struct Inner {
    method: Method,
    path: String,
    params: Params,
    query: QueryMap,
    headers: IndexMap<String, String>,
    payload: Value,
    uploads: IndexMap<String, Vec<UploadedFile>>,
}

impl ReplyRequest {
    /// Creates a request with no parameters, headers or payload.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                method,
                path: path.into(),
                params: Params::new(),
                query: QueryMap::new(),
                headers: IndexMap::new(),
                payload: Value::Null,
                uploads: IndexMap::new(),
            }),
        }
    }

    /// Reads and parses an HTTP request.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] when the query string or body cannot be
    /// read or parsed.
    pub async fn from_http<B>(
        request: http::Request<B>,
        params: Params,
        config: &ExtractConfig,
    ) -> Result<Self, ExtractionError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = request.into_parts();
        let query = parse_query(parts.uri.query())?;
        let bytes = read_body(body, config.max_body_size).await?;
        let payload = parse_payload(&parts.headers, bytes, config).await?;

        let mut headers = IndexMap::with_capacity(parts.headers.keys_len());
        for (name, value) in &parts.headers {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_string())
                    .and_modify(|joined: &mut String| {
                        joined.push_str(", ");
                        joined.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
        }

        let mut uploads: IndexMap<String, Vec<UploadedFile>> = IndexMap::new();
        for file in payload.files {
            uploads
                .entry(file.field_name.clone().unwrap_or_default())
                .or_default()
                .push(file);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                method: parts.method,
                path: parts.uri.path().to_string(),
                params,
                query,
                headers,
                payload: payload.body,
                uploads,
            }),
        })
    }

    fn inner_mut(&mut self) -> &mut Inner {
        Arc::make_mut(&mut self.inner)
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner_mut().params.push(name, value);
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner_mut().query.insert(name.into(), value.into());
        self
    }

    /// Sets a header. The name is lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.inner_mut()
            .headers
            .insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.inner_mut().payload = payload;
        self
    }

    /// Adds an uploaded file under its field name.
    #[must_use]
    pub fn with_upload(mut self, file: UploadedFile) -> Self {
        self.inner_mut()
            .uploads
            .entry(file.field_name.clone().unwrap_or_default())
            .or_default()
            .push(file);
        self
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// The request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Captured path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.inner.params
    }

    /// The parsed query string.
    #[must_use]
    pub fn query(&self) -> &QueryMap {
        &self.inner.query
    }

    /// A header value, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner
            .headers
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    /// All headers, lowercased.
    #[must_use]
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.inner.headers
    }

    /// The parsed payload. `Null` when there is none.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.inner.payload
    }

    /// Files uploaded under form field `name`.
    #[must_use]
    pub fn uploads(&self, name: &str) -> &[UploadedFile] {
        self.inner.uploads.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}
