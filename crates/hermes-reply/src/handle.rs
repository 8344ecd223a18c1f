//! Glue for handling one request end to end.

use std::future::Future;

use hermes_core::HandlerFailure;
use hermes_dispatch::{dispatch, Argument, HandlerReceiver, HandlerValue, Operation};
use http::Response;
use tracing::warn;

use crate::{Reply, ReplyBody, ReplyError, ReplyRequest, ReplyToolkit, ReplyTransport};

/// Dispatches `request` to `handler` and returns its reply or error.
///
/// A failure raised after the exchange already produced a reply (through a
/// responder) is logged and the stored reply is returned.
///
/// # Example
///
/// ```rust
/// use hermes_core::{HandlerFailure, ParamSpec, Shape};
/// use hermes_dispatch::{HandlerValue, Operation};
/// use hermes_reply::{handle, ReplyRequest, ReplyTransport};
/// use http::{Method, StatusCode};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let operation = Operation::new("getUser")
///     .param(ParamSpec::path("id", Shape::integer().required()));
/// let request = ReplyRequest::new(Method::GET, "/users/42").with_param("id", "42");
///
/// let reply = handle(&ReplyTransport::new(), &operation, &request, &(), |args| async move {
///     let id = args[0].json().cloned().unwrap_or_default();
///     Ok::<_, HandlerFailure>(HandlerValue::from(json!({ "id": id })))
/// })
/// .await
/// .unwrap();
///
/// assert_eq!(reply.status(), StatusCode::OK);
/// assert_eq!(reply.json_payload(), Some(&json!({ "id": 42 })));
/// # });
/// ```
///
/// # Errors
///
/// Returns a [`ReplyError`]: `400` for validation failures, the handler's own
/// `ReplyError` unchanged, or a translation of any other failure.
pub async fn handle<R, H, Fut>(
    transport: &ReplyTransport,
    operation: &Operation,
    request: &ReplyRequest,
    receiver: &R,
    handler: H,
) -> Result<Reply, ReplyError>
where
    R: HandlerReceiver + ?Sized,
    H: FnOnce(Vec<Argument<ReplyRequest>>) -> Fut,
    Fut: Future<Output = Result<HandlerValue, HandlerFailure>> + Send,
{
    let toolkit = ReplyToolkit::new();
    match dispatch(transport, operation, request, &toolkit, receiver, handler).await {
        Ok(reply) => Ok(reply),
        Err(error) => match toolkit.responded() {
            Some(reply) => {
                warn!(operation = %operation.id, error = %error, "failure after reply was produced");
                Ok(reply)
            }
            None => Err(error),
        },
    }
}

/// Turns either outcome of [`handle`] into an HTTP response.
#[must_use]
pub fn into_http(result: Result<Reply, ReplyError>) -> Response<ReplyBody> {
    match result {
        Ok(reply) => reply.into_response(),
        Err(error) => error.into_response(),
    }
}
