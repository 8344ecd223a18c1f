//! Glue for serving one request end to end.

use std::convert::Infallible;
use std::future::Future;

use hermes_core::HandlerFailure;
use hermes_dispatch::{dispatch, Argument, HandlerReceiver, HandlerValue, Operation};
use hermes_extract::{ExtractConfig, Params};
use http::Response;
use http_body::Body;
use tracing::{debug, warn};

use crate::error::{error_response, extraction_response};
use crate::sink::{SinkBody, SinkError};
use crate::{ExchangeRequest, HyperTransport, ResponseSink};

/// Reads `request`, dispatches it to `handler` and returns the response.
///
/// Payload errors are answered with `400`, `413` or `415` before binding.
/// A dispatch failure goes through [`error_response`] unless the exchange
/// already responded, in which case it is only logged. The response is
/// taken from the exchange's sink once the handler has settled, so a
/// responder invoked early is delivered when the handler returns.
///
/// Fits directly into `hyper::service::service_fn`.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use hermes_core::{HandlerFailure, ParamSpec, Shape};
/// use hermes_dispatch::{HandlerValue, Operation};
/// use hermes_extract::{ExtractConfig, Params};
/// use hermes_hyper::{serve, HyperTransport};
/// use http::StatusCode;
/// use http_body_util::Full;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let operation = Operation::new("getUser")
///     .param(ParamSpec::path("id", Shape::integer().required()));
/// let params: Params = [("id", "42")].into_iter().collect();
/// let request = http::Request::get("/users/42").body(Full::new(Bytes::new())).unwrap();
///
/// let response = serve(
///     &HyperTransport::new(),
///     &operation,
///     request,
///     params,
///     &ExtractConfig::default(),
///     &(),
///     |args| async move {
///         let id = args[0].json().cloned().unwrap_or_default();
///         Ok::<_, HandlerFailure>(HandlerValue::from(json!({ "id": id })))
///     },
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(response.status(), StatusCode::OK);
/// # });
/// ```
///
/// # Errors
///
/// Never fails; every outcome is a response.
pub async fn serve<B, R, H, Fut>(
    transport: &HyperTransport,
    operation: &Operation,
    request: http::Request<B>,
    params: Params,
    extract: &ExtractConfig,
    receiver: &R,
    handler: H,
) -> Result<Response<SinkBody>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    R: HandlerReceiver + ?Sized,
    H: FnOnce(Vec<Argument<ExchangeRequest>>) -> Fut,
    Fut: Future<Output = Result<HandlerValue, HandlerFailure>> + Send,
{
    let exchange = match ExchangeRequest::from_request(request, params, extract).await {
        Ok(exchange) => exchange,
        Err(error) => return Ok(extraction_response(&error)),
    };

    let (sink, mut pending) = ResponseSink::channel();
    if let Err(error) = dispatch(transport, operation, &exchange, &sink, receiver, handler).await {
        match sink.send(error_response(&error)) {
            Ok(()) => {}
            Err(SinkError::AlreadyFinalized) => {
                warn!(operation = %operation.id, error = %error, "failure after response was sent");
            }
            Err(SinkError::Closed) => debug!("response channel closed, client went away"),
        }
    }

    match pending.try_recv() {
        Some(response) => Ok(response),
        None => {
            let error = HandlerFailure::new("no response was produced").into();
            Ok(error_response(&error))
        }
    }
}
