//! Caller-supplied cancellation and deadline context.
//!
//! Every adapter operation takes a [`Context`]. A context that is already
//! cancelled or past its deadline fails the call before any wire request is
//! built, and an in-flight wire call is abandoned as soon as the context
//! becomes done.
//!
//! Clones and contexts derived with [`Context::with_timeout`] share one
//! cancellation signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::SlurmError;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    Cancelled,
    DeadlineExceeded,
}

impl From<ContextError> for SlurmError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => SlurmError::ContextRequired("context cancelled".into()),
            ContextError::DeadlineExceeded => {
                SlurmError::ContextRequired("context deadline exceeded".into())
            }
        }
    }
}

/// Cancellation signal plus optional deadline.
#[derive(Debug, Clone)]
pub struct Context {
    signal: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done unless cancelled.
    pub fn background() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal: Arc::new(signal),
            deadline: None,
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_deadline_in(timeout: Duration) -> Self {
        Self::background().with_timeout(timeout)
    }

    /// Derive a context sharing this one's cancellation, expiring at the
    /// earlier of the current deadline and `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            signal: Arc::clone(&self.signal),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every context sharing its signal.
    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// `Some` once the context is done.
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves when the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        let mut rx = self.signal.subscribe();
        let cancelled = async move {
            // The sender lives as long as `self`, so this only returns on cancel.
            let _ = rx.wait_for(|cancelled| *cancelled).await;
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = cancelled => ContextError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                cancelled.await;
                ContextError::Cancelled
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancel_is_shared() {
        let ctx = Context::background();
        let derived = ctx.with_timeout(Duration::from_secs(60));
        let clone = ctx.clone();

        ctx.cancel();
        assert_eq!(clone.err(), Some(ContextError::Cancelled));
        assert_eq!(derived.err(), Some(ContextError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = Context::with_deadline_in(Duration::from_millis(50));
        assert!(ctx.err().is_none());

        tokio::time::advance(Duration::from_millis(51)).await;
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_keeps_earlier_deadline() {
        let ctx = Context::with_deadline_in(Duration::from_secs(1));
        let derived = ctx.with_timeout(Duration::from_secs(10));
        assert_eq!(derived.deadline(), ctx.deadline());
    }

    #[tokio::test]
    async fn test_done_wakes_on_cancel() {
        let ctx = Context::background();
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.done().await });

        ctx.cancel();
        assert_eq!(handle.await.unwrap(), ContextError::Cancelled);
    }

    #[test]
    fn test_into_slurm_error() {
        let err: SlurmError = ContextError::DeadlineExceeded.into();
        assert_eq!(err.kind(), ErrorKind::ContextRequired);
        assert!(err.to_string().contains("deadline exceeded"));
    }
}
