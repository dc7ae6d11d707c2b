//! Shared utilities for the timeout integration tests.

use std::time::Duration;

use httpsample::config::{ClientConfig, FixtureConfig};
use httpsample::fixture::{FixtureServer, ResponsePlan};
use httpsample::Probe;

/// The declared body every fixture serves.
pub const BODY: &str = "12345";

/// Start a fixture on an ephemeral loopback port.
pub async fn start_fixture(plan: ResponsePlan) -> FixtureServer {
    FixtureServer::start(&FixtureConfig::default(), plan)
        .await
        .expect("fixture failed to start")
}

/// A fresh client bounded by `timeout`.
pub fn probe(timeout: Duration) -> Probe {
    Probe::new(&ClientConfig::with_timeout(timeout)).expect("client failed to build")
}

/// Headers plus `123` promptly, `45` after `delay`.
pub fn trickle(delay: Duration) -> ResponsePlan {
    ResponsePlan::immediate(BODY).split(3, delay)
}
