//! Full-body reads with byte accounting.

use bytes::{Bytes, BytesMut};
use reqwest::Response;

use crate::error::{ProbeError, TruncationCause};
use crate::lifecycle::{CancelCause, RequestDeadline};

/// Read `response` to the end, racing every chunk against `deadline`.
///
/// A stream that ends cleanly but short of `content-length` is still a
/// truncation; only a full read returns `Ok`.
pub(crate) async fn read_to_end(
    mut response: Response,
    deadline: Option<&RequestDeadline>,
) -> Result<Bytes, ProbeError> {
    let expected = response.content_length();
    let mut buf = BytesMut::with_capacity(expected.unwrap_or(0) as usize);

    loop {
        let next = match deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = deadline.cancelled() => {
                    let cause = deadline.err().unwrap_or(CancelCause::Canceled);
                    return Err(ProbeError::truncated(buf.len(), expected, TruncationCause::Cancelled(cause)));
                }
                chunk = response.chunk() => chunk,
            },
            None => response.chunk().await,
        };

        match next {
            Ok(Some(chunk)) => {
                tracing::trace!(len = chunk.len(), total = buf.len() + chunk.len(), "Body chunk received");
                buf.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(e) => {
                return Err(ProbeError::truncated(buf.len(), expected, TruncationCause::from_body_error(e)));
            }
        }
    }

    match expected {
        Some(expected) if (buf.len() as u64) < expected => {
            Err(ProbeError::truncated(buf.len(), Some(expected), TruncationCause::PrematureEof))
        }
        _ => Ok(buf.freeze()),
    }
}
