//! Cancellable execution context for API calls.
//!
//! Every request-layer operation takes a [`Context`]. A context can carry
//! an explicit cancellation signal, a deadline, both, or neither. When it
//! fires, the in-flight exchange is dropped and the call returns
//! [`FioError::Cancelled`], which is distinct from a transport failure.

use core::future::{Future, pending};
use core::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{CancelReason, FioError, Result};

/// Execution context passed to every API call.
///
/// Clones share the same cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Cancellation signal, set to `true` by [`CancelHandle::cancel`].
    cancel: Option<watch::Receiver<bool>>,
    /// Point in time after which calls fail.
    deadline: Option<Instant>,
}

/// Cancels the [`Context`] it was created with.
///
/// Dropping the handle without calling [`CancelHandle::cancel`] leaves the
/// context live.
#[derive(Debug)]
pub struct CancelHandle {
    /// Sending side of the cancellation signal.
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels the context and every clone of it.
    #[inline]
    pub fn cancel(&self) {
        _ = self.sender.send_replace(true);
    }
}

impl Context {
    /// A context that never cancels.
    #[inline]
    #[must_use]
    pub const fn background() -> Self {
        Self {
            cancel: None,
            deadline: None,
        }
    }

    /// A context that cancels once `timeout` has elapsed.
    #[inline]
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    /// A context cancelled through the returned handle.
    #[inline]
    #[must_use]
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let context = Self {
            cancel: Some(receiver),
            deadline: None,
        };
        (context, CancelHandle { sender })
    }

    /// Adds a deadline `timeout` from now, keeping any earlier one.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        if let Some(deadline) = Instant::now().checked_add(timeout) {
            self.deadline = Some(
                self.deadline
                    .map_or(deadline, |existing| existing.min(deadline)),
            );
        }
        self
    }

    /// Returns why this context is done, or `None` while it is live.
    #[inline]
    #[must_use]
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        if self.cancel.as_ref().is_some_and(|receiver| *receiver.borrow()) {
            Some(CancelReason::Cancelled)
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(CancelReason::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Drives `future` to completion unless the context fires first.
    ///
    /// A context that is already done short-circuits without polling
    /// `future`.
    ///
    /// # Errors
    ///
    /// Returns [`FioError::Cancelled`] if the context is cancelled or its
    /// deadline passes before `future` completes.
    #[inline]
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output> {
        if let Some(reason) = self.cancel_reason() {
            tracing::debug!(%reason, "context already done");
            return Err(FioError::Cancelled(reason));
        }
        let mut cancel = self.cancel.clone();
        tokio::select! {
            biased;
            () = cancelled(cancel.as_mut()) => Err(FioError::Cancelled(CancelReason::Cancelled)),
            () = deadline_reached(self.deadline) => {
                Err(FioError::Cancelled(CancelReason::DeadlineExceeded))
            }
            output = future => Ok(output),
        }
    }
}

/// Resolves once the signal turns `true`; never resolves otherwise.
async fn cancelled(receiver: Option<&mut watch::Receiver<bool>>) {
    if let Some(signal) = receiver {
        if signal.wait_for(|cancelled| *cancelled).await.is_ok() {
            return;
        }
    }
    // No signal, or the handle was dropped without cancelling.
    pending::<()>().await;
}

/// Resolves at `deadline`; never resolves without one.
async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = Context::background();
        assert_eq!(ctx.run(async { 7 }).await.unwrap(), 7);
        assert_eq!(ctx.cancel_reason(), None);
    }

    #[tokio::test]
    async fn cancelled_before_start_short_circuits() {
        let (ctx, handle) = Context::with_cancel();
        handle.cancel();
        let err = ctx.run(async { 1 }).await.unwrap_err();
        assert!(matches!(err, FioError::Cancelled(CancelReason::Cancelled)));
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_future() {
        let (ctx, handle) = Context::with_cancel();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });
        let err = ctx.run(pending::<()>()).await.unwrap_err();
        assert!(matches!(err, FioError::Cancelled(CancelReason::Cancelled)));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_cancellation() {
        let (ctx, handle) = Context::with_cancel();
        let clone = ctx.clone();
        handle.cancel();
        assert_eq!(clone.cancel_reason(), Some(CancelReason::Cancelled));
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::with_cancel();
        drop(handle);
        let ctx = ctx.timeout(Duration::from_millis(20));
        let err = ctx.run(pending::<()>()).await.unwrap_err();
        assert!(matches!(
            err,
            FioError::Cancelled(CancelReason::DeadlineExceeded)
        ));
    }

    #[tokio::test]
    async fn deadline_interrupts_pending_future() {
        let ctx = Context::with_timeout(Duration::from_millis(20));
        let err = ctx.run(pending::<()>()).await.unwrap_err();
        assert!(matches!(
            err,
            FioError::Cancelled(CancelReason::DeadlineExceeded)
        ));
    }

    #[test]
    fn timeout_keeps_earlier_deadline() {
        let ctx = Context::with_timeout(Duration::from_secs(1)).timeout(Duration::from_secs(60));
        let deadline = ctx.deadline.unwrap();
        assert!(deadline <= Instant::now() + Duration::from_secs(1));
    }

    #[test]
    fn zero_timeout_is_done_immediately() {
        let ctx = Context::with_timeout(Duration::ZERO);
        assert_eq!(ctx.cancel_reason(), Some(CancelReason::DeadlineExceeded));
    }
}
