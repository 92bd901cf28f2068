//! The hook point through which the engine reaches the real transport.

use std::future::Future;

use async_trait::async_trait;

use crate::http::{Outcome, RequestDescriptor};

/// Performs the network round-trip for one request.
///
/// Failures are reported as `Err(RequestError)` with the status, headers and
/// message the server produced.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, request: RequestDescriptor) -> Outcome;
}

#[async_trait]
impl<F, Fut> Dispatch for F
where
    F: Fn(RequestDescriptor) -> Fut + Send + Sync,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    async fn dispatch(&self, request: RequestDescriptor) -> Outcome {
        (self)(request).await
    }
}
