//! Probe client.
//!
//! # Responsibilities
//! - Build a fresh reqwest client per scenario (no pooled connections carried over)
//! - Issue one GET, bounded by the client timeout and an optional deadline
//! - Read the whole body, counting bytes against `content-length`
//!
//! # Design Decisions
//! - Timeout enforcement is left to reqwest/tokio; this only observes the result
//! - The deadline is raced against the send and each body chunk, so the
//!   failure is attributed to it even when the transport would have failed later

mod body;

use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::StatusCode;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ProbeError;
use crate::lifecycle::{CancelCause, RequestDeadline};

/// A completed exchange: headers and the fully read body.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: StatusCode,
    pub content_length: Option<u64>,
    pub body: Bytes,
    /// Time from call start to headers received.
    pub headers_after: Duration,
    /// Time from call start to the last body byte.
    pub elapsed: Duration,
}

/// An HTTP client configured with one set of bounds.
pub struct Probe {
    client: reqwest::Client,
    config: ClientConfig,
}

impl Probe {
    pub fn new(config: &ClientConfig) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .map_err(ProbeError::Build)?;

        Ok(Self {
            client,
            config: *config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `url` and read the whole body.
    pub async fn fetch(&self, url: &Url, deadline: Option<&RequestDeadline>) -> Result<Exchange, ProbeError> {
        let start = Instant::now();
        tracing::debug!(
            url = %url,
            timeout = ?self.config.timeout,
            deadline = ?deadline.and_then(RequestDeadline::remaining),
            "Sending request"
        );

        let send = self.client.get(url.clone()).send();
        let sent = match deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = deadline.cancelled() => {
                    let cause = deadline.err().unwrap_or(CancelCause::Canceled);
                    return Err(ProbeError::Cancelled { url: url.to_string(), cause });
                }
                res = send => res,
            },
            None => send.await,
        };
        let response = sent.map_err(|source| ProbeError::Send {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let content_length = response.content_length();
        let headers_after = start.elapsed();
        tracing::debug!(
            status = %status,
            content_length = ?content_length,
            after = ?headers_after,
            "Headers received"
        );

        let body = body::read_to_end(response, deadline).await?;

        Ok(Exchange {
            status,
            content_length,
            body,
            headers_after,
            elapsed: start.elapsed(),
        })
    }
}
