use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use super::path::normalize_path;
use super::percentiles::PercentileSet;
use super::{ConfigError, MetricEvent, MetricsConfig};

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe telemetry engine.
/// Request instrumentation calls `record()`, the admin surface calls
/// `snapshot()` and `reset()`. One instance lives in the application's
/// shared state for the lifetime of the process.
pub struct MetricsCollector {
    inner: Mutex<Inner>,
}

/// Aggregate report over the current sliding window.
/// Serialized straight into the admin metrics endpoint's JSON body, so the
/// field names follow the established camelCase wire contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    /// Responses with status ≥ 500
    pub total_errors: u64,
    /// Mean duration in ms, rounded to two decimals
    pub average_response_time: f64,
    pub min_response_time: u64,
    pub max_response_time: u64,
    /// `total_requests / (window length in seconds)`
    pub requests_per_second: f64,
    pub status_codes: HashMap<u16, u64>,
    /// Keyed by `"{METHOD} {path}"` after path normalization
    pub endpoints: HashMap<String, EndpointStats>,
    pub response_time_percentiles: PercentileSet,
    /// Milliseconds since the collector was created or last reset
    pub uptime: u64,
    /// Unix-epoch milliseconds at snapshot creation
    pub timestamp: i64,
}

/// Per-endpoint rollup inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStats {
    pub count: u64,
    /// Mean duration in ms, rounded to two decimals
    pub avg_response_time: f64,
    pub errors: u64,
}

// ─── Internal state ──────────────────────────────────────────────

/// One retained observation. Timestamped on insertion, never mutated after.
#[derive(Debug, Clone)]
struct EventRecord {
    method: String,
    path: String,
    status_code: u16,
    duration_ms: u64,
    recorded_at: Instant,
}

struct Inner {
    // Oldest-first. `recorded_at` is assigned under the lock, so insertion
    // order is timestamp order and window maintenance only touches the front.
    events: VecDeque<EventRecord>,
    window: Duration,
    max_events: usize,
    // Uptime anchor; restarted by reset()
    started_at: Instant,
}

/// Running totals for one endpoint while a snapshot is being built.
#[derive(Default)]
struct EndpointAccumulator {
    count: u64,
    duration_sum: u64,
    errors: u64,
}

// ─── MetricsCollector impl ───────────────────────────────────────

impl MetricsCollector {
    /// Collector with the stock bounds: 60 s window, 10 000 events.
    pub fn new() -> Self {
        Self::from_config(MetricsConfig::default())
    }

    /// Collector with explicit bounds, validated up front.
    pub fn with_config(config: MetricsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: MetricsConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::new(config, Instant::now())),
        }
    }

    /// Record one completed request. Called from every handler's
    /// completion path; never fails.
    pub fn record(&self, event: MetricEvent) {
        self.inner.lock().record(event, Instant::now());
    }

    /// Aggregate report over the events inside the window right now.
    /// Does not mutate the store — back-to-back snapshots with no
    /// intervening records agree on everything but uptime/timestamp.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().snapshot(Instant::now())
    }

    /// Drop all events and restart the uptime anchor.
    pub fn reset(&self) {
        self.inner.lock().reset(Instant::now());
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new(config: MetricsConfig, now: Instant) -> Self {
        Self {
            events: VecDeque::new(),
            window: Duration::from_millis(config.window_ms),
            max_events: config.max_events,
            started_at: now,
        }
    }

    fn record(&mut self, event: MetricEvent, now: Instant) {
        let path = normalize_path(&event.path);
        trace!(
            method = %event.method,
            path = %path,
            status = event.status_code,
            duration_ms = event.duration_ms,
            "request recorded"
        );

        self.events.push_back(EventRecord {
            method: event.method,
            path,
            status_code: event.status_code,
            duration_ms: event.duration_ms,
            recorded_at: now,
        });
        self.prune(now);
    }

    /// Window maintenance: drop events older than the window, then enforce
    /// the size cap. Both bounds evict from the front (oldest first).
    fn prune(&mut self, now: Instant) {
        if let Some(cutoff) = now.checked_sub(self.window) {
            while self
                .events
                .front()
                .is_some_and(|e| e.recorded_at < cutoff)
            {
                self.events.pop_front();
            }
        }
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    fn reset(&mut self, now: Instant) {
        let dropped = self.events.len();
        self.events.clear();
        self.started_at = now;
        debug!(dropped, "metrics reset");
    }

    /// Build a complete report from the events still inside the window.
    /// Pruning here is view-level only: expired events are skipped, not
    /// removed, so the store itself stays untouched.
    fn snapshot(&self, now: Instant) -> MetricsSnapshot {
        let uptime = now.duration_since(self.started_at).as_millis() as u64;
        let timestamp = Utc::now().timestamp_millis();

        // Events are oldest-first, so the in-window suffix starts at the
        // first record at or after the cutoff.
        let start = match now.checked_sub(self.window) {
            Some(cutoff) => {
                self.events.partition_point(|e| e.recorded_at < cutoff)
            }
            None => 0,
        };

        let total_requests = (self.events.len() - start) as u64;
        if total_requests == 0 {
            return MetricsSnapshot::empty(uptime, timestamp);
        }

        let mut durations = Vec::with_capacity(total_requests as usize);
        let mut total_errors = 0u64;
        let mut status_codes: HashMap<u16, u64> = HashMap::new();
        let mut groups: HashMap<String, EndpointAccumulator> = HashMap::new();

        for event in self.events.range(start..) {
            durations.push(event.duration_ms);
            *status_codes.entry(event.status_code).or_insert(0) += 1;

            let is_error = event.status_code >= 500;
            if is_error {
                total_errors += 1;
            }

            let group = groups
                .entry(format!("{} {}", event.method, event.path))
                .or_default();
            group.count += 1;
            group.duration_sum += event.duration_ms;
            if is_error {
                group.errors += 1;
            }
        }

        durations.sort_unstable();

        let total_duration: u64 = durations.iter().sum();
        let average_response_time =
            round2(total_duration as f64 / durations.len() as f64);
        let requests_per_second =
            total_requests as f64 / (self.window.as_millis() as f64 / 1000.0);

        let endpoints = groups
            .into_iter()
            .map(|(key, acc)| (key, acc.finish()))
            .collect();

        MetricsSnapshot {
            total_requests,
            total_errors,
            average_response_time,
            min_response_time: durations[0],
            max_response_time: durations[durations.len() - 1],
            requests_per_second,
            status_codes,
            endpoints,
            response_time_percentiles: PercentileSet::from_sorted(&durations),
            uptime,
            timestamp,
        }
    }
}

impl MetricsSnapshot {
    /// All-zero report for an empty window. Uptime and timestamp are still
    /// live — they are not derived from the window contents.
    fn empty(uptime: u64, timestamp: i64) -> Self {
        Self {
            total_requests: 0,
            total_errors: 0,
            average_response_time: 0.0,
            min_response_time: 0,
            max_response_time: 0,
            requests_per_second: 0.0,
            status_codes: HashMap::new(),
            endpoints: HashMap::new(),
            response_time_percentiles: PercentileSet::empty(),
            uptime,
            timestamp,
        }
    }
}

impl EndpointAccumulator {
    fn finish(self) -> EndpointStats {
        EndpointStats {
            count: self.count,
            avg_response_time: round2(
                self.duration_sum as f64 / self.count as f64,
            ),
            errors: self.errors,
        }
    }
}

/// Round to two decimal places, matching the wire format's precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ─── Tests ───────────────────────────────────────────────────────
