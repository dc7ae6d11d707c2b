//! Request-scoped cancellation deadline.
//!
//! # Responsibilities
//! - Bound a request independently of the client's own timeout
//! - Record why the request was cancelled (explicit cancel vs. elapsed deadline)
//! - Stay queryable after the request has failed
//!
//! # Design Decisions
//! - Built on `tokio_util::sync::CancellationToken`; the cause is written
//!   before the token fires, so an observer that sees the token cancelled
//!   always sees the cause
//! - The first cause wins; later cancels do not overwrite it

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a [`RequestDeadline`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum CancelCause {
    #[error("request canceled")]
    Canceled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl CancelCause {
    /// Whether the cause is an elapsed time bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CancelCause::DeadlineExceeded)
    }
}

/// Cancellation signal attached to a single request.
#[derive(Debug, Clone)]
pub struct RequestDeadline {
    token: CancellationToken,
    cause: Arc<OnceLock<CancelCause>>,
    deadline: Option<Instant>,
}

impl RequestDeadline {
    /// A signal with no deadline; it only fires through [`cancel`](Self::cancel).
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            cause: Arc::new(OnceLock::new()),
            deadline: None,
        }
    }

    /// A signal that fires with [`CancelCause::DeadlineExceeded`] once `timeout` elapses.
    ///
    /// Must be called from within a tokio runtime; the timer runs on a spawned task.
    pub fn after(timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let this = Self {
            deadline: Some(deadline),
            ..Self::new()
        };

        let timer = this.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    timer.cancel_with(CancelCause::DeadlineExceeded);
                }
                _ = timer.token.cancelled() => {}
            }
        });

        this
    }

    /// Cancel explicitly.
    pub fn cancel(&self) {
        self.cancel_with(CancelCause::Canceled);
    }

    fn cancel_with(&self, cause: CancelCause) {
        if self.cause.set(cause).is_ok() {
            tracing::debug!(%cause, "Request deadline fired");
        }
        self.token.cancel();
    }

    /// Whether the signal has fired.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The cause, once the signal has fired.
    pub fn err(&self) -> Option<CancelCause> {
        if self.token.is_cancelled() {
            self.cause.get().copied()
        } else {
            None
        }
    }

    /// Resolves once the signal fires.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// The instant the deadline elapses, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, saturating at zero.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

impl Default for RequestDeadline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let deadline = RequestDeadline::after(Duration::from_millis(20));
        assert!(!deadline.is_done());
        assert_eq!(deadline.err(), None);

        deadline.cancelled().await;
        assert!(deadline.is_done());
        assert_eq!(deadline.err(), Some(CancelCause::DeadlineExceeded));
        assert!(deadline.err().unwrap().is_timeout());
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_explicit_cancel_wins() {
        let deadline = RequestDeadline::after(Duration::from_millis(50));
        deadline.cancel();
        assert_eq!(deadline.err(), Some(CancelCause::Canceled));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(deadline.err(), Some(CancelCause::Canceled));
        assert!(!CancelCause::Canceled.is_timeout());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let deadline = RequestDeadline::new();
        let observer = deadline.clone();
        assert_eq!(observer.deadline(), None);

        deadline.cancel();
        assert!(observer.is_done());
        assert_eq!(observer.err(), Some(CancelCause::Canceled));
    }

    #[test]
    fn test_cause_messages() {
        assert_eq!(CancelCause::DeadlineExceeded.to_string(), "deadline exceeded");
        assert_eq!(CancelCause::Canceled.to_string(), "request canceled");
    }
}
