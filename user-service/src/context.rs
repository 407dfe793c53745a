//! Per-request execution context.
//!
//! A [`RequestContext`] carries the cancellation token and optional deadline of
//! the request that issued a backend call. Futures driven through
//! [`RequestContext::run`] are dropped as soon as either fires, which releases
//! any cursor or pooled connection they were holding.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("request was cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            deadline: None,
        }
    }

    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::new(CancellationToken::new())
    }

    /// Sets the deadline to `now + timeout`, keeping an earlier deadline if
    /// one is already set.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Drives `fut` unless the context is cancelled or its deadline passes
    /// first. Cancellation wins over completion when both are ready.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => Err(Interrupted::Cancelled),
                output = fut => Ok(output),
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(Interrupted::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}
