//! Named timeout scenarios.
//!
//! Each run starts a fresh fixture and a fresh client, issues one request,
//! classifies the outcome and tears the fixture down again.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::classify::{classify, Classification};
use crate::client::{Exchange, Probe};
use crate::config::{ClientConfig, SampleConfig, TimingConfig};
use crate::error::ProbeError;
use crate::fixture::{FixtureError, FixtureServer, ResponsePlan};
use crate::lifecycle::{CancelCause, RequestDeadline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    ImmediateSuccess,
    TimeoutBeforeHeaders,
    TimeoutDuringBody,
    CancellationDeadline,
    PeerClosedMidBody,
}

/// Error type for scenario setup. Request failures are reported, not returned.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("fixture: {0}")]
    Fixture(#[from] FixtureError),

    #[error("client: {0}")]
    Client(#[from] ProbeError),

    #[error("unknown scenario {0:?}")]
    Unknown(String),
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::ImmediateSuccess,
        Scenario::TimeoutBeforeHeaders,
        Scenario::TimeoutDuringBody,
        Scenario::CancellationDeadline,
        Scenario::PeerClosedMidBody,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::ImmediateSuccess => "immediate-success",
            Scenario::TimeoutBeforeHeaders => "timeout-before-headers",
            Scenario::TimeoutDuringBody => "timeout-during-body",
            Scenario::CancellationDeadline => "cancellation-deadline",
            Scenario::PeerClosedMidBody => "peer-closed-mid-body",
        }
    }

    /// What the fixture writes.
    pub fn plan(&self, timing: &TimingConfig) -> ResponsePlan {
        let body = bytes::Bytes::from(timing.body.clone());
        match self {
            Scenario::ImmediateSuccess => ResponsePlan::immediate(body),
            Scenario::TimeoutBeforeHeaders => ResponsePlan::immediate(body).delayed(timing.header_delay()),
            Scenario::TimeoutDuringBody | Scenario::CancellationDeadline => {
                ResponsePlan::immediate(body).split(timing.split_at, timing.tail_delay())
            }
            Scenario::PeerClosedMidBody => ResponsePlan::immediate(body)
                .split(timing.split_at, timing.abort_delay())
                .abort_tail(),
        }
    }

    /// Client-side bounds.
    pub fn client_config(&self, timing: &TimingConfig) -> ClientConfig {
        match self {
            Scenario::ImmediateSuccess | Scenario::PeerClosedMidBody => {
                ClientConfig::with_timeout(timing.success_timeout())
            }
            Scenario::TimeoutBeforeHeaders => ClientConfig::with_timeout(timing.header_timeout()),
            Scenario::TimeoutDuringBody => ClientConfig::with_timeout(timing.body_timeout()),
            Scenario::CancellationDeadline => {
                ClientConfig::with_timeout(timing.cancel_client_timeout()).deadline(timing.cancel_deadline())
            }
        }
    }

    /// The classification a run should produce.
    pub fn expected(&self) -> Classification {
        match self {
            Scenario::ImmediateSuccess => Classification::Success,
            Scenario::TimeoutBeforeHeaders => Classification::HeaderTimeout,
            Scenario::TimeoutDuringBody | Scenario::PeerClosedMidBody => Classification::BodyTruncated,
            Scenario::CancellationDeadline => Classification::DeadlineExceeded,
        }
    }

    /// Run once with a fresh fixture and client.
    pub async fn run(&self, config: &SampleConfig) -> Result<ScenarioReport, ScenarioError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("scenario", %run_id, scenario = %self);
        self.run_inner(run_id, config).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, config: &SampleConfig) -> Result<ScenarioReport, ScenarioError> {
        let plan = self.plan(&config.timing);
        let expected_len = plan.content_length() as u64;
        let client_config = self.client_config(&config.timing);

        let fixture = FixtureServer::start(&config.fixture, plan).await?;
        let probe = Probe::new(&client_config)?;

        let start = Instant::now();
        let deadline = client_config.deadline.map(RequestDeadline::after);
        let result = probe.fetch(fixture.url(), deadline.as_ref()).await;
        let elapsed = start.elapsed();

        let classification = classify(&result, deadline.as_ref());
        fixture.shutdown().await;

        let report = ScenarioReport::new(run_id, *self, classification, expected_len, elapsed, &result, deadline.as_ref());
        match &result {
            Ok(exchange) => tracing::info!(
                classification = %classification,
                status = %exchange.status,
                received = exchange.body.len(),
                elapsed = ?elapsed,
                "Request succeeded"
            ),
            Err(e) => tracing::info!(
                classification = %classification,
                error = %e.chain(),
                error_debug = ?e,
                timeout = e.is_timeout(),
                retryable = e.is_retryable(),
                deadline = ?report.deadline,
                elapsed = ?elapsed,
                "Request failed"
            ),
        }

        Ok(report)
    }

    /// Run `times` times in sequence, each with fresh instances.
    pub async fn repeat(&self, times: usize, config: &SampleConfig) -> Result<Vec<ScenarioReport>, ScenarioError> {
        let mut reports = Vec::with_capacity(times);
        for _ in 0..times {
            reports.push(self.run(config).await?);
        }
        Ok(reports)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| ScenarioError::Unknown(s.to_string()))
    }
}

/// Observed result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub run_id: Uuid,
    pub scenario: Scenario,
    pub classification: Classification,
    pub expected: Classification,
    pub status: Option<u16>,
    /// Body bytes obtained, whether or not the read completed.
    pub received: Option<u64>,
    pub expected_len: u64,
    pub body: Option<String>,
    pub error: Option<String>,
    pub timeout: Option<bool>,
    pub retryable: Option<bool>,
    pub deadline: Option<CancelCause>,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl ScenarioReport {
    fn new(
        run_id: Uuid,
        scenario: Scenario,
        classification: Classification,
        expected_len: u64,
        elapsed: Duration,
        result: &Result<Exchange, ProbeError>,
        deadline: Option<&RequestDeadline>,
    ) -> Self {
        let mut report = Self {
            run_id,
            scenario,
            classification,
            expected: scenario.expected(),
            status: None,
            received: None,
            expected_len,
            body: None,
            error: None,
            timeout: None,
            retryable: None,
            deadline: deadline.and_then(RequestDeadline::err),
            elapsed,
        };
        match result {
            Ok(exchange) => {
                report.status = Some(exchange.status.as_u16());
                report.received = Some(exchange.body.len() as u64);
                report.body = Some(String::from_utf8_lossy(&exchange.body).into_owned());
            }
            Err(e) => {
                report.received = e.received();
                report.error = Some(e.chain());
                report.timeout = Some(e.is_timeout());
                report.retryable = Some(e.is_retryable());
            }
        }
        report
    }

    pub fn matches_expectation(&self) -> bool {
        self.classification == self.expected
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {:<18} {:>5}ms received={}/{}",
            self.scenario.name(),
            self.classification,
            self.elapsed.as_millis(),
            self.received.map_or_else(|| "-".to_string(), |r| r.to_string()),
            self.expected_len,
        )?;
        if let Some(timeout) = self.timeout {
            write!(f, " timeout={timeout}")?;
        }
        if let Some(cause) = self.deadline {
            write!(f, " deadline=\"{cause}\"")?;
        }
        if let Some(error) = &self.error {
            write!(f, " error=\"{error}\"")?;
        }
        if !self.matches_expectation() {
            write!(f, " (expected {})", self.expected)?;
        }
        Ok(())
    }
}
