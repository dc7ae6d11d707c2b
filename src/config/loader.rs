//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::SampleConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<SampleConfig, ConfigError> {
    let config: SampleConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SampleConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.timing.body, "12345");
        assert_eq!(config.timing.split_at, 3);
        assert_eq!(config.fixture.bind_address, "127.0.0.1:0");
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
            [timing]
            tail_delay_ms = 3000
            body_timeout_ms = 1500

            [observability]
            log_filter = "httpsample=trace"
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.tail_delay_ms, 3000);
        assert_eq!(config.timing.body_timeout_ms, 1500);
        assert_eq!(config.timing.header_delay_ms, 500);
        assert_eq!(config.observability.log_filter, "httpsample=trace");
    }

    #[test]
    fn test_invalid_timing_rejected() {
        let err = parse_config("[timing]\nbody_timeout_ms = 5000\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::BodyTimeoutTooLong]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_abort_after_client_timeout_rejected() {
        let err = parse_config("[timing]\nabort_delay_ms = 4000\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::AbortDelayTooLong]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[timing"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/httpsample.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
