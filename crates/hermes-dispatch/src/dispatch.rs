//! The call site: bind, invoke, finalize.

use std::future::Future;

use hermes_core::HandlerFailure;
use tracing::{debug, instrument};

use crate::{Argument, ArgumentBinder, HandlerReceiver, HandlerValue, Operation};

/// Runs one exchange through a transport.
///
/// 1. Binds the operation's parameters from `request`. A validation failure
///    is handed to [`reject`](crate::ResponseFinalizer::reject) and the
///    handler is not called.
/// 2. Calls `handler` with the bound arguments.
/// 3. Settles the handler's outcome through the transport's finalizer.
///
/// # Errors
///
/// Returns the transport's rejection of a validation or handler failure.
#[instrument(skip_all, fields(operation = %operation.id))]
pub async fn dispatch<T, R, H, Fut>(
    transport: &T,
    operation: &Operation,
    request: &T::Request,
    handle: &T::Handle,
    receiver: &R,
    handler: H,
) -> Result<T::Output, T::Error>
where
    T: ArgumentBinder,
    R: HandlerReceiver + ?Sized,
    H: FnOnce(Vec<Argument<T::Request>>) -> Fut,
    Fut: Future<Output = Result<HandlerValue, HandlerFailure>> + Send,
{
    let arguments = match transport.bind_arguments(&operation.params, request, handle) {
        Ok(arguments) => arguments,
        Err(failure) => return Err(transport.reject(failure.into())),
    };

    debug!(arguments = arguments.len(), "invoking handler");
    transport
        .finalize_from_outcome(receiver, handler(arguments), handle, operation.success_status)
        .await
}
