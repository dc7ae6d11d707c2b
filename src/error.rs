//! Error types surfaced by a probe request.
//!
//! The variants separate the phase a failure happened in (before headers vs.
//! while reading the body) from what enforced it, so callers can classify a
//! failure without parsing messages.

use std::error::Error as StdError;
use std::io;

use crate::lifecycle::CancelCause;

/// Failure of a single probe request. Never retried internally.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// No response headers were obtained.
    #[error("GET {url}: {source}")]
    Send {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The cancellation deadline fired while awaiting headers.
    #[error("GET {url}: {cause} while awaiting headers")]
    Cancelled { url: String, cause: CancelCause },

    /// Headers arrived, but the body ended before its declared length.
    #[error("body truncated after {received} of {} bytes: {cause}", display_len(.expected))]
    BodyTruncated {
        received: u64,
        expected: Option<u64>,
        #[source]
        cause: TruncationCause,
    },
}

fn display_len(len: &Option<u64>) -> String {
    len.map_or_else(|| "unknown".to_string(), |l| l.to_string())
}

/// What cut a body read short.
#[derive(Debug, thiserror::Error)]
pub enum TruncationCause {
    /// The client's overall timeout elapsed mid-body.
    #[error("client timeout elapsed")]
    TimedOut(#[source] reqwest::Error),

    /// The peer closed or reset the connection.
    #[error("connection closed by peer")]
    PeerClosed(#[source] reqwest::Error),

    /// The request's cancellation deadline fired.
    #[error("{0}")]
    Cancelled(CancelCause),

    /// The stream ended cleanly but short of `content-length`.
    #[error("unexpected EOF")]
    PrematureEof,

    #[error("transport error")]
    Transport(#[source] reqwest::Error),
}

impl TruncationCause {
    /// Sort a body-read error by the condition the stack reported.
    pub fn from_body_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TruncationCause::TimedOut(err)
        } else if is_connection_closed(&err) {
            TruncationCause::PeerClosed(err)
        } else {
            TruncationCause::Transport(err)
        }
    }
}

/// Walk the source chain looking for an early close of the connection.
fn is_connection_closed(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(err) = source {
        if let Some(hyper_err) = err.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() {
                return true;
            }
        }
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        source = err.source();
    }
    false
}

/// Render an error with its whole source chain, skipping causes whose
/// message the text already includes.
pub fn display_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = cause.source();
    }
    out
}

impl ProbeError {
    /// The message plus every underlying cause.
    pub fn chain(&self) -> String {
        display_chain(self)
    }

    pub(crate) fn truncated(received: usize, expected: Option<u64>, cause: TruncationCause) -> Self {
        ProbeError::BodyTruncated {
            received: received as u64,
            expected,
            cause,
        }
    }

    /// Whether the transport reported an elapsed time bound.
    ///
    /// A body read aborted by a cancellation deadline is not a transport
    /// timeout; query the [`RequestDeadline`](crate::lifecycle::RequestDeadline)
    /// for that.
    pub fn is_timeout(&self) -> bool {
        match self {
            ProbeError::Build(_) => false,
            ProbeError::Send { source, .. } => source.is_timeout(),
            ProbeError::Cancelled { cause, .. } => cause.is_timeout(),
            ProbeError::BodyTruncated { cause, .. } => matches!(cause, TruncationCause::TimedOut(_)),
        }
    }

    /// Header-phase timeouts are safe to retry; nothing was consumed.
    pub fn is_retryable(&self) -> bool {
        self.is_header_phase() && self.is_timeout()
    }

    pub fn is_header_phase(&self) -> bool {
        matches!(self, ProbeError::Send { .. } | ProbeError::Cancelled { .. })
    }

    pub fn is_body_phase(&self) -> bool {
        matches!(self, ProbeError::BodyTruncated { .. })
    }

    /// Whether the request was aborted by its cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ProbeError::Cancelled { .. }
                | ProbeError::BodyTruncated { cause: TruncationCause::Cancelled(_), .. }
        )
    }

    /// Bytes read before a body-phase failure.
    pub fn received(&self) -> Option<u64> {
        match self {
            ProbeError::BodyTruncated { received, .. } => Some(*received),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_message() {
        let err = ProbeError::truncated(3, Some(5), TruncationCause::PrematureEof);
        assert_eq!(err.to_string(), "body truncated after 3 of 5 bytes: unexpected EOF");
        assert!(err.is_body_phase());
        assert!(!err.is_header_phase());
        assert!(!err.is_timeout());
        assert!(!err.is_retryable());
        assert_eq!(err.received(), Some(3));
    }

    #[test]
    fn test_cancelled_body_is_not_transport_timeout() {
        let err = ProbeError::truncated(
            3,
            None,
            TruncationCause::Cancelled(CancelCause::DeadlineExceeded),
        );
        assert_eq!(
            err.to_string(),
            "body truncated after 3 of unknown bytes: deadline exceeded"
        );
        assert!(err.is_cancelled());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_cancelled_before_headers() {
        let err = ProbeError::Cancelled {
            url: "http://127.0.0.1:1/".into(),
            cause: CancelCause::DeadlineExceeded,
        };
        assert!(err.is_header_phase());
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert!(err.is_cancelled());
        assert_eq!(err.received(), None);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct Wrapped(#[source] io::Error);

    #[test]
    fn test_display_chain_keeps_causes() {
        let err = Wrapped(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"));
        assert_eq!(display_chain(&err), "error sending request: operation timed out");
    }

    #[test]
    fn test_display_chain_skips_repeated_messages() {
        let err = ProbeError::truncated(3, Some(5), TruncationCause::PrematureEof);
        assert_eq!(err.chain(), err.to_string());
    }

    #[test]
    fn test_io_chain_detection() {
        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(is_connection_closed(&reset));

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert!(!is_connection_closed(&other));
    }
}
