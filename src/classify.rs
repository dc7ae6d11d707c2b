//! Outcome classification.

use std::fmt;

use serde::Serialize;

use crate::client::Exchange;
use crate::error::{ProbeError, TruncationCause};
use crate::lifecycle::{CancelCause, RequestDeadline};

/// The tagged outcome of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Headers and the full body were read.
    Success,
    /// A time bound elapsed before any response headers arrived.
    HeaderTimeout,
    /// Headers arrived; the body ended before its declared length.
    BodyTruncated,
    /// The request's cancellation deadline elapsed and aborted it.
    DeadlineExceeded,
    /// Any other failure (connection refused, explicit cancel, ...).
    Failed,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::HeaderTimeout => "header_timeout",
            Classification::BodyTruncated => "body_truncated",
            Classification::DeadlineExceeded => "deadline_exceeded",
            Classification::Failed => "failed",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a probe result.
///
/// A failure is attributed to the cancellation deadline whenever the deadline,
/// queried after the fact, reports that it elapsed. This holds regardless of
/// how the in-flight error itself was classified.
pub fn classify(result: &Result<Exchange, ProbeError>, deadline: Option<&RequestDeadline>) -> Classification {
    let err = match result {
        Ok(_) => return Classification::Success,
        Err(err) => err,
    };

    if deadline.and_then(RequestDeadline::err) == Some(CancelCause::DeadlineExceeded) {
        return Classification::DeadlineExceeded;
    }

    match err {
        ProbeError::Send { .. } if err.is_timeout() => Classification::HeaderTimeout,
        ProbeError::Cancelled { cause, .. }
        | ProbeError::BodyTruncated { cause: TruncationCause::Cancelled(cause), .. } => {
            if cause.is_timeout() {
                Classification::DeadlineExceeded
            } else {
                Classification::Failed
            }
        }
        ProbeError::BodyTruncated { .. } => Classification::BodyTruncated,
        _ => Classification::Failed,
    }
}
