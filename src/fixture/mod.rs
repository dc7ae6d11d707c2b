//! Server fixture subsystem.
//!
//! # Data Flow
//! ```text
//! ResponsePlan (plan.rs)
//!     → FixtureServer::start (server.rs): bind 127.0.0.1:0, spawn axum::serve
//!     → every request: sleep head_delay → headers + prompt bytes
//!                      → sleep tail_delay → remainder, or abort
//!     → shutdown()/drop: stop accepting, abort the serve task
//! ```

pub mod plan;
pub mod server;

pub use plan::{ResponsePlan, Tail};
pub use server::{FixtureError, FixtureServer};
