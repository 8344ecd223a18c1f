//! The reply artifact and the per-exchange toolkit that holds it.

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use futures_util::TryStreamExt;
use hermes_dispatch::{BoxError, ByteStream};
use http::{HeaderMap, Response, StatusCode};
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use parking_lot::Mutex;
use serde_json::Value;

/// Body type of [`Reply::into_response`].
pub type ReplyBody = UnsyncBoxBody<Bytes, BoxError>;

/// A finished reply.
///
/// Clones share the same reply; [`Reply::ptr_eq`] tells whether two values
/// are the same artifact. A stream payload can be taken out once; later
/// conversions of a clone get an empty body.
#[derive(Clone)]
pub struct Reply {
    inner: Arc<ReplyInner>,
}

struct ReplyInner {
    status: StatusCode,
    headers: HeaderMap,
    payload: ReplyPayload,
}

enum ReplyPayload {
    Empty,
    Json(Value),
    Stream(Mutex<Option<ByteStream>>),
}

impl Reply {
    pub(crate) fn empty(status: StatusCode, headers: HeaderMap) -> Self {
        Self::with_payload(status, headers, ReplyPayload::Empty)
    }

    pub(crate) fn json(status: StatusCode, headers: HeaderMap, value: Value) -> Self {
        Self::with_payload(status, headers, ReplyPayload::Json(value))
    }

    pub(crate) fn stream(status: StatusCode, headers: HeaderMap, stream: ByteStream) -> Self {
        Self::with_payload(status, headers, ReplyPayload::Stream(Mutex::new(Some(stream))))
    }

    fn with_payload(status: StatusCode, headers: HeaderMap, payload: ReplyPayload) -> Self {
        Self {
            inner: Arc::new(ReplyInner {
                status,
                headers,
                payload,
            }),
        }
    }

    /// The response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status
    }

    /// The response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// The JSON payload, if the reply carries one.
    #[must_use]
    pub fn json_payload(&self) -> Option<&Value> {
        match &self.inner.payload {
            ReplyPayload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` when the reply has no payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.inner.payload, ReplyPayload::Empty)
    }

    /// Returns `true` when the reply pipes a byte stream.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self.inner.payload, ReplyPayload::Stream(_))
    }

    /// Returns `true` when both values are the same artifact.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    /// Converts into an HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response<ReplyBody> {
        let body = match &self.inner.payload {
            ReplyPayload::Empty => empty_body(),
            ReplyPayload::Json(value) => full_body(value.to_string()),
            ReplyPayload::Stream(stream) => match stream.lock().take() {
                Some(stream) => StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync(),
                None => empty_body(),
            },
        };
        let mut response = Response::new(body);
        *response.status_mut() = self.inner.status;
        *response.headers_mut() = self.inner.headers.clone();
        response
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = match &self.inner.payload {
            ReplyPayload::Empty => "empty",
            ReplyPayload::Json(_) => "json",
            ReplyPayload::Stream(_) => "stream",
        };
        f.debug_struct("Reply")
            .field("status", &self.inner.status)
            .field("headers", &self.inner.headers)
            .field("payload", &payload)
            .finish()
    }
}

pub(crate) fn full_body(bytes: impl Into<Bytes>) -> ReplyBody {
    Full::new(bytes.into())
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed_unsync()
}

fn empty_body() -> ReplyBody {
    Empty::<Bytes>::new()
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed_unsync()
}

/// Per-exchange response handle of the value transport.
///
/// Holds the exchange's reply once one has been produced. The first reply
/// stored wins; it is what every later finalization returns.
///
/// # Example
///
/// ```rust
/// use hermes_reply::ReplyToolkit;
///
/// let toolkit = ReplyToolkit::new();
/// assert!(!toolkit.is_responded());
/// assert!(toolkit.responded().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplyToolkit {
    reply: Arc<OnceLock<Reply>>,
}

impl ReplyToolkit {
    /// Creates a toolkit for a new exchange.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The reply produced for this exchange, if any.
    #[must_use]
    pub fn responded(&self) -> Option<Reply> {
        self.reply.get().cloned()
    }

    /// Returns `true` once a reply was produced.
    #[must_use]
    pub fn is_responded(&self) -> bool {
        self.reply.get().is_some()
    }

    /// Stores the reply built by `build`, unless one is already stored.
    /// Returns the stored reply either way.
    pub(crate) fn respond_with(&self, build: impl FnOnce() -> Reply) -> Reply {
        self.reply.get_or_init(build).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::json;

    async fn collect(body: ReplyBody) -> Bytes {
        body.collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_first_reply_wins() {
        let toolkit = ReplyToolkit::new();
        let first =
            toolkit.respond_with(|| Reply::empty(StatusCode::NO_CONTENT, HeaderMap::new()));
        let second =
            toolkit.respond_with(|| Reply::json(StatusCode::OK, HeaderMap::new(), json!(1)));

        assert!(Reply::ptr_eq(&first, &second));
        assert_eq!(second.status(), StatusCode::NO_CONTENT);
        assert!(toolkit.is_responded());
    }

    #[test]
    fn test_clones_share_the_toolkit() {
        let toolkit = ReplyToolkit::new();
        let clone = toolkit.clone();
        clone.respond_with(|| Reply::empty(StatusCode::ACCEPTED, HeaderMap::new()));

        assert_eq!(
            toolkit.responded().map(|r| r.status()),
            Some(StatusCode::ACCEPTED)
        );
    }

    #[tokio::test]
    async fn test_json_reply_into_response() {
        let reply = Reply::json(StatusCode::OK, HeaderMap::new(), json!({"ok": true}));
        assert_eq!(reply.json_payload(), Some(&json!({"ok": true})));

        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(collect(response.into_body()).await, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_stream_taken_once() {
        let chunks: Vec<Result<Bytes, BoxError>> = vec![Ok(Bytes::from("abc"))];
        let reply = Reply::stream(
            StatusCode::OK,
            HeaderMap::new(),
            Box::pin(stream::iter(chunks)),
        );
        let copy = reply.clone();
        assert!(reply.is_stream());

        assert_eq!(collect(reply.into_response().into_body()).await, "abc");
        assert!(collect(copy.into_response().into_body()).await.is_empty());
    }
}
