//! Cooperative cancellation.
//!
//! A single [`CancellationToken`] is threaded through every suspension point
//! of an operation: the pipeline's downstream call, the account-level
//! consistency lookup and each page read. Cancelling aborts whatever is still
//! pending. Work already committed by the service (for example a create that
//! succeeded before cancellation was observed) is not rolled back.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use crate::ClientError;

/// A cloneable cancellation signal.
///
/// All clones observe the same state; cancelling any clone cancels them all.
///
/// # Example
///
/// ```ignore
/// use docdb_client::CancellationToken;
///
/// let cancel = CancellationToken::new();
/// let response = pipeline.send(&request, &cancel).await?;
///
/// // elsewhere
/// cancel.cancel();
/// ```
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token and wake every waiter.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Drive `future` to completion unless the token fires first.
    ///
    /// Returns [`ClientError::Canceled`] if the token is (or becomes) cancelled
    /// before `future` completes; `future` is dropped in that case.
    pub async fn run_until_cancelled<F>(&self, future: F) -> Result<F::Output, ClientError>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(ClientError::Canceled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ClientError::Canceled),
            output = future => Ok(output),
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
