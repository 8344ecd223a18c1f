//! Values a handler settles with.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use serde::Serialize;
use serde_json::Value;

/// Boxed error carried by byte streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A readable byte stream. Piped to the client as-is.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// What a handler returned.
pub enum HandlerValue {
    /// Nothing (`()` or JSON `null`).
    Empty,
    /// A JSON-serializable value.
    Json(Value),
    /// A byte stream.
    Stream(ByteStream),
}

impl HandlerValue {
    /// Serializes `value` into a JSON result. `null` becomes [`HandlerValue::Empty`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Wraps a byte stream.
    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        use futures_util::TryStreamExt;
        Self::Stream(Box::pin(stream.map_err(|e| -> BoxError { e.into() })))
    }

    /// Returns `true` for [`HandlerValue::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` for [`HandlerValue::Stream`].
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl From<Value> for HandlerValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            value => Self::Json(value),
        }
    }
}

impl From<()> for HandlerValue {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl<T: Into<HandlerValue>> From<Option<T>> for HandlerValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl From<ByteStream> for HandlerValue {
    fn from(stream: ByteStream) -> Self {
        Self::Stream(stream)
    }
}

impl fmt::Debug for HandlerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{stream, StreamExt};
    use serde_json::json;

    #[test]
    fn test_null_is_empty() {
        assert!(HandlerValue::from(Value::Null).is_empty());
        assert!(HandlerValue::from(()).is_empty());
        assert!(HandlerValue::from(None::<Value>).is_empty());
        assert!(!HandlerValue::from(json!(0)).is_empty());
    }

    #[test]
    fn test_json_from_serialize() {
        #[derive(Serialize)]
        struct User {
            id: u32,
        }

        match HandlerValue::json(&User { id: 7 }).unwrap() {
            HandlerValue::Json(value) => assert_eq!(value, json!({"id": 7})),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_is_kept_as_stream() {
        let chunks = stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"a")),
            Ok(Bytes::from_static(b"b")),
        ]);
        let value = HandlerValue::stream(chunks);
        assert!(value.is_stream());

        let HandlerValue::Stream(mut stream) = value else {
            panic!("expected stream");
        };
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"ab");
    }
}
