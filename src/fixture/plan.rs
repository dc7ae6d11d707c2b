//! Response plans: what the fixture writes, and when.

use std::time::Duration;

use bytes::Bytes;

/// What happens after the tail delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// Write the rest of the body.
    Deliver,
    /// Abort the connection instead.
    Abort,
}

/// A single scripted response.
///
/// `content-length` always reflects the full `body`, whether or not the
/// remainder is ever written.
#[derive(Debug, Clone)]
pub struct ResponsePlan {
    /// Sleep before any part of the response is written.
    pub head_delay: Duration,
    /// Declared body.
    pub body: Bytes,
    /// Bytes written promptly; `None` writes the body in one piece.
    pub split_at: Option<usize>,
    /// Sleep between the prompt part and the remainder.
    pub tail_delay: Duration,
    pub tail: Tail,
}

impl ResponsePlan {
    /// Respond at once with the whole body.
    pub fn immediate(body: impl Into<Bytes>) -> Self {
        Self {
            head_delay: Duration::ZERO,
            body: body.into(),
            split_at: None,
            tail_delay: Duration::ZERO,
            tail: Tail::Deliver,
        }
    }

    /// Sleep `delay` before writing headers.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.head_delay = delay;
        self
    }

    /// Write `at` bytes promptly and the rest after `delay`.
    pub fn split(mut self, at: usize, delay: Duration) -> Self {
        self.split_at = Some(at);
        self.tail_delay = delay;
        self
    }

    /// Abort the connection where the remainder would have been written.
    pub fn abort_tail(mut self) -> Self {
        self.tail = Tail::Abort;
        self
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// The prompt part and, for split plans, the delayed remainder.
    pub fn chunks(&self) -> (Bytes, Option<Bytes>) {
        match self.split_at {
            Some(at) if at < self.body.len() => {
                (self.body.slice(..at), Some(self.body.slice(at..)))
            }
            _ => (self.body.clone(), None),
        }
    }
}
