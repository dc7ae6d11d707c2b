//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (timings still trigger each scenario)
//!     → SampleConfig (validated, immutable)
//!     → TimingConfig handed to scenarios, ClientConfig derived per run
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; an absent file means stock timings
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ClientConfig, FixtureConfig, ObservabilityConfig, SampleConfig, TimingConfig};
pub use validation::ValidationError;
