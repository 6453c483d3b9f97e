//! Per-request cancellation context
//!
//! Every use case receives a [`RequestContext`] and runs its repository calls
//! through [`RequestContext::run`]. When the token is cancelled or the deadline
//! passes first, the pending store future is dropped and the call resolves to
//! an [`Interrupted`] error instead of hanging.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::UserError;

/// Why a guarded call did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupted> for UserError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => UserError::Cancelled,
            Interrupted::DeadlineExceeded => UserError::DeadlineExceeded,
        }
    }
}

/// Cancellation token plus optional deadline, cloned into each request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context that is never cancelled on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Child context: cancelled together with `parent`, keeping the earlier
    /// of the two deadlines.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            token: self.token.child_token(),
            deadline: Some(match self.deadline {
                Some(parent) if parent < deadline => parent,
                _ => deadline,
            }),
        }
    }

    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` to completion unless the context is cancelled or expires
    /// first. An already-cancelled context never polls `fut`.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Cancelled),
            _ = expired => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_not_interrupted() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.run(async { 42 }).await, Ok(42));
    }

    #[tokio::test]
    async fn cancelled_context_does_not_poll_future() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let polled = std::sync::atomic::AtomicBool::new(false);
        let res = ctx
            .run(async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
            })
            .await;
        assert_eq!(res, Err(Interrupted::Cancelled));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancellation_aborts_pending_future() {
        let ctx = RequestContext::new();
        let handle = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });
        let res = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(res, Err(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn deadline_expires() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(20));
        let res = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(res, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test]
    async fn child_follows_parent_cancellation() {
        let parent = RequestContext::new();
        let child = parent.child_with_timeout(Duration::from_secs(30));
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn interrupted_maps_to_user_error() {
        assert!(matches!(
            UserError::from(Interrupted::Cancelled),
            UserError::Cancelled
        ));
        assert!(matches!(
            UserError::from(Interrupted::DeadlineExceeded),
            UserError::DeadlineExceeded
        ));
    }
}
