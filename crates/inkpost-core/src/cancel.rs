//! Caller-driven cancellation of core operations.

use std::future::Future;

use futures::future::{self, Either};
use futures::pin_mut;

use crate::error::{DomainError, DomainResult};

/// Run `operation` until it completes or `signal` resolves, whichever is first.
///
/// When the signal wins the operation future is dropped, which aborts any
/// store call it was awaiting, and `DomainError::Cancelled` is returned.
pub async fn run_cancellable<T, S, F>(signal: S, operation: F) -> DomainResult<T>
where
    S: Future<Output = ()>,
    F: Future<Output = DomainResult<T>>,
{
    pin_mut!(signal);
    pin_mut!(operation);

    match future::select(operation, signal).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _abandoned)) => {
            tracing::debug!("Operation cancelled before completion");
            Err(DomainError::Cancelled)
        }
    }
}
