//! The request handle bound to handlers.

use std::sync::Arc;

use hermes_core::UploadedFile;
use hermes_extract::{
    parse_payload, parse_query, read_body, ExtractConfig, ExtractionError, Params, Payload,
    QueryMap,
};
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use http_body::Body;
use serde_json::Value;

/// A fully read HTTP request.
///
/// Cloning is cheap; the parts are shared.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use hermes_extract::{ExtractConfig, Params};
/// use hermes_hyper::ExchangeRequest;
/// use http_body_util::Full;
///
/// # tokio_test::block_on(async {
/// let request = http::Request::post("/users?verbose=true")
///     .header("content-type", "application/json")
///     .body(Full::new(Bytes::from(r#"{"name":"ada"}"#)))
///     .unwrap();
///
/// let exchange = ExchangeRequest::from_request(request, Params::new(), &ExtractConfig::default())
///     .await
///     .unwrap();
///
/// assert_eq!(exchange.query()["verbose"], "true");
/// assert_eq!(exchange.body()["name"], "ada");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: Params,
    query: QueryMap,
    body: Value,
    files: Vec<UploadedFile>,
}

impl ExchangeRequest {
    /// Reads and parses an HTTP request.
    ///
    /// `params` are the path segments the router captured.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] when the query string or body cannot be
    /// read or parsed, or the body is over the configured limit.
    pub async fn from_request<B>(
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
        Ok(Self::from_parts(parts, params, query, payload))
    }

    /// Assembles a request from already parsed pieces.
    #[must_use]
    pub fn from_parts(parts: Parts, params: Params, query: QueryMap, payload: Payload) -> Self {
        Self {
            inner: Arc::new(Inner {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                params,
                query,
                body: payload.body,
                files: payload.files,
            }),
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// The request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// A header value, looked up case-insensitively. Repeated headers are
    /// joined with `", "`. Values that are not visible ASCII are skipped.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .inner
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
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

    /// The parsed body. `Null` when the request had none.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.inner.body
    }

    /// The first uploaded file.
    #[must_use]
    pub fn file(&self) -> Option<&UploadedFile> {
        self.inner.files.first()
    }

    /// Every uploaded file, in arrival order.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.inner.files
    }

    /// Files uploaded under form field `name`, in arrival order.
    pub fn uploads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UploadedFile> + 'a {
        self.inner
            .files
            .iter()
            .filter(move |file| file.field_name.as_deref() == Some(name))
    }
}
