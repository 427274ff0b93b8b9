pub mod collector;
pub mod path;
pub mod percentiles;

pub use collector::{EndpointStats, MetricsCollector, MetricsSnapshot};
pub use percentiles::PercentileSet;

use serde::Deserialize;
use thiserror::Error;

// ─── Defaults ────────────────────────────────────────────────────

/// Sliding-window length over which aggregates are computed
const DEFAULT_WINDOW_MS: u64 = 60_000;

/// Hard cap on retained events — roughly the last 10k requests
const DEFAULT_MAX_EVENTS: usize = 10_000;

// ─── Public types ────────────────────────────────────────────────

/// A single completed-request observation.
/// This is the "write" side — the instrumentation layer creates these and
/// pushes them in via [`MetricsCollector::record`].
#[derive(Debug, Clone)]
pub struct MetricEvent {
    /// e.g. "GET"
    pub method: String,
    /// Raw request path; numeric segments and the query string are
    /// normalized away when the event is recorded
    pub path: String,
    /// Status of the completed response
    pub status_code: u16,
    /// Handler wall time in milliseconds
    pub duration_ms: u64,
}

/// Window bounds for a [`MetricsCollector`], deserializable from the
/// application's config file. Both bounds apply simultaneously: events
/// older than `window_ms` are dropped, and at most `max_events` are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Sliding-window length (milliseconds)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Hard cap on retained events; oldest are dropped first
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

fn default_window_ms() -> u64 {
    DEFAULT_WINDOW_MS
}
fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl MetricsConfig {
    /// Reject bounds that would make the window degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.max_events == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Rejected collector configuration, surfaced synchronously at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window_ms must be greater than zero")]
    ZeroWindow,
    #[error("max_events must be greater than zero")]
    ZeroCapacity,
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, MetricsConfig};

    #[test]
    fn default_bounds_match_the_service_constants() {
        let config = MetricsConfig::default();
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.max_events, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: MetricsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.max_events, 10_000);

        let config: MetricsConfig =
            serde_json::from_str(r#"{"window_ms": 5000}"#).unwrap();
        assert_eq!(config.window_ms, 5_000);
        assert_eq!(config.max_events, 10_000);
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        let config = MetricsConfig { window_ms: 0, max_events: 10 };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWindow));

        let config = MetricsConfig { window_ms: 1_000, max_events: 0 };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }
}
