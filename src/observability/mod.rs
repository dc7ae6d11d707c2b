//! Observability subsystem.
//!
//! Scenario runs log inside a `scenario` span carrying the run ID, so the
//! fixture's request traces and the client's classification line up.

pub mod logging;

pub use logging::{init_logging, LogHandle};
