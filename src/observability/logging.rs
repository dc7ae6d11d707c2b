//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate with key/value fields on every event
//! - Filter comes from `RUST_LOG` when set, otherwise from configuration
//! - The subscriber is installed before configuration is read; the filter is
//!   swapped in through a reload handle once it is known

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, util::TryInitError, EnvFilter, Registry,
};

use crate::config::ObservabilityConfig;

/// Build the filter: `RUST_LOG` wins over the configured default.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
}

/// Handle to the installed filter.
#[derive(Clone)]
pub struct LogHandle(reload::Handle<EnvFilter, Registry>);

impl LogHandle {
    /// Replace the active filter with the one `config` describes.
    pub fn apply(&self, config: &ObservabilityConfig) -> Result<(), reload::Error> {
        self.0.reload(env_filter(config))
    }

    /// The active filter directives, `None` once the subscriber is gone.
    pub fn current_filter(&self) -> Option<String> {
        self.0.with_current(|filter| filter.to_string()).ok()
    }
}

fn reloadable_filter(config: &ObservabilityConfig) -> (reload::Layer<EnvFilter, Registry>, LogHandle) {
    let (layer, handle) = reload::Layer::new(env_filter(config));
    (layer, LogHandle(handle))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<LogHandle, TryInitError> {
    let (filter, handle) = reloadable_filter(config);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_swaps_filter() {
        let (_layer, handle) = reloadable_filter(&ObservabilityConfig::default());
        let verbose = ObservabilityConfig {
            log_filter: "httpsample=trace".to_string(),
        };

        handle.apply(&verbose).unwrap();
        assert_eq!(handle.current_filter(), Some(env_filter(&verbose).to_string()));
    }

    #[test]
    fn test_handle_reports_dropped_filter() {
        let (layer, handle) = reloadable_filter(&ObservabilityConfig::default());
        drop(layer);

        assert!(handle.apply(&ObservabilityConfig::default()).is_err());
        assert_eq!(handle.current_filter(), None);
    }
}
