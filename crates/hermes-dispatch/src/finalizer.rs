//! Response finalization.
//!
//! A transport implements [`ResponseFinalizer::finalize`] and
//! [`ResponseFinalizer::reject`]; the rest is shared:
//!
//! - a successful outcome is settled through the receiver's controller state
//!   (its headers, and its status over the operation's success status),
//! - a failed outcome goes to `reject`,
//! - a [`Responder`] finalizes through the same `finalize`.
//!
//! `finalize` must take effect at most once per exchange. Implementations
//! keep an explicit per-exchange marker next to the handle for that.

use std::future::Future;

use hermes_core::{DispatchError, HandlerFailure};
use http::StatusCode;
use tracing::debug;

use crate::controller::{inspect, HandlerReceiver, Receiver};
use crate::{HandlerValue, HeaderSet, Responder};

/// Turns a handler outcome into exactly one response.
pub trait ResponseFinalizer: Clone + Send + Sync + 'static {
    /// Per-exchange response handle.
    type Handle: Clone + Send + Sync + 'static;

    /// What finalization produces.
    type Output: Send;

    /// What a failure is turned into for the transport's error pipeline.
    type Error: Send;

    /// Produces the response.
    ///
    /// Once the exchange has been finalized, later calls have no effect.
    /// Headers are applied as given. The status defaults to `200` when
    /// there is data (JSON or a stream) and to `204` when there is none.
    fn finalize(
        &self,
        handle: &Self::Handle,
        headers: HeaderSet,
        status: Option<StatusCode>,
        data: HandlerValue,
    ) -> Self::Output;

    /// Hands a failure to the transport's error convention.
    fn reject(&self, error: DispatchError) -> Self::Error;

    /// Finalizes a successful outcome using the receiver's controller state.
    fn settle(
        &self,
        receiver: Receiver<'_>,
        value: HandlerValue,
        handle: &Self::Handle,
        success_status: Option<StatusCode>,
    ) -> Self::Output {
        let (headers, status) = receiver.response_state();
        let status = status.or(success_status);
        debug!(
            status = status.map(|s| s.as_u16()),
            headers = headers.len(),
            stream = value.is_stream(),
            "settling handler outcome"
        );
        self.finalize(handle, headers, status, value)
    }

    /// Builds a responder bound to `handle`.
    fn make_responder(&self, handle: &Self::Handle) -> Responder {
        let finalizer = self.clone();
        let handle = handle.clone();
        Responder::new(move |status, data, headers| {
            let _ = finalizer.finalize(&handle, headers, status, data);
        })
    }

    /// Awaits the handler, then settles or rejects its outcome.
    fn finalize_from_outcome<'a, R, F>(
        &'a self,
        receiver: &'a R,
        outcome: F,
        handle: &'a Self::Handle,
        success_status: Option<StatusCode>,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send + 'a
    where
        R: HandlerReceiver + ?Sized,
        F: Future<Output = Result<HandlerValue, HandlerFailure>> + Send + 'a,
    {
        async move {
            match outcome.await {
                Ok(value) => Ok(self.settle(inspect(receiver), value, handle, success_status)),
                Err(failure) => {
                    debug!(name = failure.name(), "handler failed");
                    Err(self.reject(failure.into()))
                }
            }
        }
    }
}
