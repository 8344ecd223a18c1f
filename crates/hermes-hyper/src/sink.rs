//! The response channel of one exchange.
//!
//! [`ResponseSink::channel`] pairs a sink, which the transport writes the
//! response into, with a [`PendingResponse`] the connection side awaits.
//! The sink carries the exchange's [`ResponseState`]: only the first
//! response sent through it is delivered.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::TryStreamExt;
use hermes_dispatch::{BoxError, ByteStream, ResponseState};
use http::Response;
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;

/// Response body produced by the transport.
pub type SinkBody = UnsyncBoxBody<Bytes, BoxError>;

/// Why a response was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// A response was already sent for this exchange.
    #[error("exchange already finalized")]
    AlreadyFinalized,

    /// The receiving side went away.
    #[error("response channel closed")]
    Closed,
}

/// Writing side of an exchange's response channel.
#[derive(Clone)]
pub struct ResponseSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    state: ResponseState,
    sender: Mutex<Option<oneshot::Sender<Response<SinkBody>>>>,
}

/// Receiving side of an exchange's response channel.
pub struct PendingResponse {
    receiver: oneshot::Receiver<Response<SinkBody>>,
}

impl ResponseSink {
    /// Opens a fresh, unfinalized channel.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hermes_hyper::{empty_body, ResponseSink, SinkError};
    ///
    /// # tokio_test::block_on(async {
    /// let (sink, pending) = ResponseSink::channel();
    ///
    /// sink.send(http::Response::new(empty_body())).unwrap();
    /// assert_eq!(
    ///     sink.send(http::Response::new(empty_body())),
    ///     Err(SinkError::AlreadyFinalized)
    /// );
    ///
    /// assert!(pending.recv().await.is_some());
    /// # });
    /// ```
    #[must_use]
    pub fn channel() -> (Self, PendingResponse) {
        let (sender, receiver) = oneshot::channel();
        let sink = Self {
            inner: Arc::new(SinkInner {
                state: ResponseState::new(),
                sender: Mutex::new(Some(sender)),
            }),
        };
        (sink, PendingResponse { receiver })
    }

    /// Sends the exchange's response.
    ///
    /// The exchange is marked finalized before the channel is touched, so a
    /// response that cannot be delivered still counts as sent.
    ///
    /// # Errors
    ///
    /// [`SinkError::AlreadyFinalized`] on every call after the first, and
    /// [`SinkError::Closed`] when the receiving side was dropped.
    pub fn send(&self, response: Response<SinkBody>) -> Result<(), SinkError> {
        if !self.inner.state.try_finalize() {
            return Err(SinkError::AlreadyFinalized);
        }
        let sender = self.inner.sender.lock().take();
        match sender {
            Some(sender) => sender.send(response).map_err(|_| SinkError::Closed),
            None => Err(SinkError::Closed),
        }
    }

    /// Returns `true` once the receiving side can no longer get a response.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self.inner.sender.lock().as_ref() {
            Some(sender) => sender.is_closed(),
            None => true,
        }
    }

    /// Returns `true` once a response was sent.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.inner.state.is_finalized()
    }
}

impl fmt::Debug for ResponseSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSink")
            .field("finalized", &self.is_finalized())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl fmt::Debug for PendingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResponse").finish_non_exhaustive()
    }
}

impl PendingResponse {
    /// Waits for the response. `None` when the sink was dropped unanswered.
    pub async fn recv(self) -> Option<Response<SinkBody>> {
        self.receiver.await.ok()
    }

    /// Takes the response if one was already sent.
    pub fn try_recv(&mut self) -> Option<Response<SinkBody>> {
        self.receiver.try_recv().ok()
    }
}

/// A body holding `bytes`.
#[must_use]
pub fn full_body(bytes: impl Into<Bytes>) -> SinkBody {
    Full::new(bytes.into())
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed_unsync()
}

/// A body with no content.
#[must_use]
pub fn empty_body() -> SinkBody {
    Empty::<Bytes>::new()
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed_unsync()
}

/// A body that pipes `stream` through chunk by chunk.
#[must_use]
pub fn stream_body(stream: ByteStream) -> SinkBody {
    StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    async fn collect(body: SinkBody) -> Bytes {
        body.collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_first_send_wins() {
        let (sink, pending) = ResponseSink::channel();
        assert!(!sink.is_finalized());

        sink.send(Response::new(full_body("first"))).unwrap();
        let second = sink.clone().send(Response::new(full_body("second")));
        assert_eq!(second, Err(SinkError::AlreadyFinalized));
        assert!(sink.is_finalized());

        let response = pending.recv().await.unwrap();
        assert_eq!(collect(response.into_body()).await, "first");
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (sink, pending) = ResponseSink::channel();
        drop(pending);

        assert!(sink.is_closed());
        assert_eq!(
            sink.send(Response::new(empty_body())),
            Err(SinkError::Closed)
        );
        assert!(sink.is_finalized());
    }

    #[tokio::test]
    async fn test_dropped_sink_yields_nothing() {
        let (sink, pending) = ResponseSink::channel();
        drop(sink);
        assert!(pending.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_body_pipes_chunks() {
        let chunks: Vec<Result<Bytes, BoxError>> =
            vec![Ok(Bytes::from("ab")), Ok(Bytes::from("cd"))];
        let body = stream_body(Box::pin(stream::iter(chunks)));
        assert_eq!(collect(body).await, "abcd");
    }
}
