//! HTTP client timeout sampling.
//!
//! Spins up a loopback server fixture that stalls before or during its
//! response, drives one bounded GET against it, and classifies the error the
//! client stack reports.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod fixture;
pub mod lifecycle;
pub mod observability;
pub mod scenario;

pub use classify::{classify, Classification};
pub use client::{Exchange, Probe};
pub use config::{ClientConfig, SampleConfig};
pub use error::{ProbeError, TruncationCause};
pub use fixture::{FixtureServer, ResponsePlan};
pub use lifecycle::{CancelCause, RequestDeadline};
pub use scenario::{Scenario, ScenarioReport};
