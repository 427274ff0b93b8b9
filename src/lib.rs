//! In-process runtime telemetry for the quiz backend: a sliding-window
//! request-metrics aggregator and the TTL response cache that fronts
//! expensive aggregate queries.
//!
//! Both stores are plain shared-memory structures with no I/O and no
//! background tasks. The composition root builds one [`MetricsCollector`]
//! and one [`TtlCache`] per process at startup and hands them to request
//! handlers by reference:
//!
//! - every completed request pushes a [`MetricEvent`] into the collector;
//!   an operator endpoint pulls a [`MetricsSnapshot`] on demand and ships
//!   it as JSON,
//! - query services read through the cache (`get`, on miss compute + `set`)
//!   and state-mutating operations invalidate whole key families with
//!   [`TtlCache::clear_by_prefix`].
//!
//! Every operation locks a `parking_lot` mutex for at most the duration of
//! one window pass, so both stores are safe to call from any number of
//! concurrent request completions.

pub mod cache;
pub mod metrics;

pub use cache::{CacheError, TtlCache};
pub use metrics::{
    ConfigError, EndpointStats, MetricEvent, MetricsCollector, MetricsConfig,
    MetricsSnapshot, PercentileSet,
};
