//! Configuration validation.
//!
//! Serde handles syntax; this checks that the timings still trigger the
//! conditions each scenario is meant to observe. All problems are reported,
//! not just the first.

use std::net::SocketAddr;

use crate::config::schema::SampleConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("fixture.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("timing.body must not be empty")]
    EmptyBody,

    #[error("timing.split_at ({split_at}) must be between 1 and {max}")]
    SplitOutOfRange { split_at: usize, max: usize },

    #[error("timing.header_timeout_us must be shorter than timing.header_delay_ms")]
    HeaderTimeoutTooLong,

    #[error("timing.body_timeout_ms must be shorter than timing.tail_delay_ms")]
    BodyTimeoutTooLong,

    #[error("timing.cancel_deadline_ms must be shorter than timing.cancel_client_timeout_ms")]
    DeadlineNotShorter,

    #[error("timing.cancel_deadline_ms must be shorter than timing.tail_delay_ms")]
    DeadlineTooLong,

    #[error("timing.abort_delay_ms must be shorter than timing.success_timeout_ms")]
    AbortDelayTooLong,

    #[error("timing.{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SampleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.fixture.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.fixture.bind_address.clone()));
    }

    let timing = &config.timing;
    let len = timing.body.len();
    if len == 0 {
        errors.push(ValidationError::EmptyBody);
    } else if timing.split_at == 0 || timing.split_at >= len {
        errors.push(ValidationError::SplitOutOfRange { split_at: timing.split_at, max: len - 1 });
    }

    for (name, value) in [
        ("header_timeout_us", timing.header_timeout_us),
        ("body_timeout_ms", timing.body_timeout_ms),
        ("cancel_deadline_ms", timing.cancel_deadline_ms),
        ("success_timeout_ms", timing.success_timeout_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    if timing.header_timeout() >= timing.header_delay() {
        errors.push(ValidationError::HeaderTimeoutTooLong);
    }
    if timing.body_timeout() >= timing.tail_delay() {
        errors.push(ValidationError::BodyTimeoutTooLong);
    }
    if timing.cancel_deadline() >= timing.cancel_client_timeout() {
        errors.push(ValidationError::DeadlineNotShorter);
    }
    if timing.cancel_deadline() >= timing.tail_delay() {
        errors.push(ValidationError::DeadlineTooLong);
    }
    if timing.abort_delay() >= timing.success_timeout() {
        errors.push(ValidationError::AbortDelayTooLong);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&SampleConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = SampleConfig::default();
        config.fixture.bind_address = "localhost".into();
        config.timing.split_at = 5;
        config.timing.cancel_deadline_ms = 2500;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BindAddress("localhost".into())));
        assert!(errors.contains(&ValidationError::SplitOutOfRange { split_at: 5, max: 4 }));
        assert!(errors.contains(&ValidationError::DeadlineNotShorter));
        assert!(errors.contains(&ValidationError::DeadlineTooLong));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_header_timeout_must_undercut_delay() {
        let mut config = SampleConfig::default();
        config.timing.header_timeout_us = 600_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::HeaderTimeoutTooLong]);
    }

    #[test]
    fn test_abort_delay_must_undercut_client_timeout() {
        let mut config = SampleConfig::default();
        config.timing.abort_delay_ms = 4000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::AbortDelayTooLong]);

        config.timing.abort_delay_ms = 3000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::AbortDelayTooLong]);
    }
}
