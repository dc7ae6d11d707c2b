//! Configuration schema definitions.
//!
//! Every section derives Serde traits and carries defaults, so an empty file
//! reproduces the stock scenario timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for a sampling session.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SampleConfig {
    /// Server fixture settings.
    pub fixture: FixtureConfig,

    /// Scenario timings.
    pub timing: TimingConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Server fixture configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Bind address. Port 0 picks an ephemeral port.
    pub bind_address: String,

    /// Value of the `content-type` response header.
    pub content_type: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            content_type: "text/plain".to_string(),
        }
    }
}

/// Timings shared by all scenarios.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Declared response body.
    pub body: String,

    /// Bytes of `body` written before the tail delay.
    pub split_at: usize,

    /// Server sleep before headers in the header-timeout scenario.
    pub header_delay_ms: u64,

    /// Client timeout in the header-timeout scenario, in microseconds.
    pub header_timeout_us: u64,

    /// Server sleep between the partial body and its remainder.
    pub tail_delay_ms: u64,

    /// Client timeout in the body-timeout scenario.
    pub body_timeout_ms: u64,

    /// Client timeout in the cancellation scenario.
    pub cancel_client_timeout_ms: u64,

    /// Cancellation deadline in the cancellation scenario.
    pub cancel_deadline_ms: u64,

    /// Client timeout in the success and peer-closure scenarios.
    pub success_timeout_ms: u64,

    /// Server sleep before aborting the connection in the peer-closure scenario.
    pub abort_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            body: "12345".to_string(),
            split_at: 3,
            header_delay_ms: 500,
            header_timeout_us: 300,
            tail_delay_ms: 2000,
            body_timeout_ms: 1000,
            cancel_client_timeout_ms: 2000,
            cancel_deadline_ms: 1000,
            success_timeout_ms: 3000,
            abort_delay_ms: 50,
        }
    }
}

impl TimingConfig {
    pub fn header_delay(&self) -> Duration {
        Duration::from_millis(self.header_delay_ms)
    }

    pub fn header_timeout(&self) -> Duration {
        Duration::from_micros(self.header_timeout_us)
    }

    pub fn tail_delay(&self) -> Duration {
        Duration::from_millis(self.tail_delay_ms)
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }

    pub fn cancel_client_timeout(&self) -> Duration {
        Duration::from_millis(self.cancel_client_timeout_ms)
    }

    pub fn cancel_deadline(&self) -> Duration {
        Duration::from_millis(self.cancel_deadline_ms)
    }

    pub fn success_timeout(&self) -> Duration {
        Duration::from_millis(self.success_timeout_ms)
    }

    pub fn abort_delay(&self) -> Duration {
        Duration::from_millis(self.abort_delay_ms)
    }
}

/// Client-side bounds for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Overall call timeout, covering headers and body.
    pub timeout: Duration,

    /// Cancellation deadline attached to the request independently of `timeout`.
    pub deadline: Option<Duration>,
}

impl ClientConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, deadline: None }
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "httpsample=info".to_string(),
        }
    }
}
