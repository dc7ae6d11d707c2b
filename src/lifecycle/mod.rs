//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Fixture teardown (shutdown.rs):
//!     trigger() → serve loop stops accepting → in-flight connections drain
//!
//! Request cancellation (deadline.rs):
//!     RequestDeadline::after(d) → timer task → token cancelled with cause
//!     → in-flight send/body read aborted → cause queryable afterwards
//! ```

pub mod deadline;
pub mod shutdown;

pub use deadline::{CancelCause, RequestDeadline};
pub use shutdown::Shutdown;
