//! Cancellable execution context passed into every store operation.
//!
//! An [`OpContext`] bundles a [`CancellationToken`] with an optional deadline.
//! Store implementations wrap their I/O in [`OpContext::run`], which races the
//! operation against both and reports whichever fires first as an error, so a
//! cancelled caller never sees a silently completed operation.

use crate::error::{QueueError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Execution context for a single store call (or a group of calls).
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// Context with no deadline that is only cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing token (e.g. a shutdown token)
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Attach a deadline `timeout` from now
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Derive a context that is cancelled with its parent but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast if the context is already cancelled or past its deadline
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(QueueError::Cancelled {
                operation: operation.to_string(),
            });
        }

        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(QueueError::TimedOut {
                operation: operation.to_string(),
            });
        }

        Ok(())
    }

    /// Run `fut` under this context.
    ///
    /// The future is dropped (aborting the in-flight I/O) as soon as the token
    /// is cancelled or the deadline elapses.
    pub async fn run<F, T>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check(operation)?;

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(QueueError::Cancelled {
                operation: operation.to_string(),
            }),
            () = sleep_until(self.deadline) => Err(QueueError::TimedOut {
                operation: operation.to_string(),
            }),
            result = fut => result,
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
