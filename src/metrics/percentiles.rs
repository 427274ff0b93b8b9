use serde::Serialize;

/// Rank-based percentile breakdown over one window of response times.
/// Serialized straight into the snapshot JSON under `responseTimePercentiles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PercentileSet {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
}

impl PercentileSet {
    /// Extract p50/p95/p99 from an ascending-sorted slice of durations.
    /// Returns zeroed values if the slice is empty.
    pub fn from_sorted(durations: &[u64]) -> Self {
        if durations.is_empty() {
            return Self::empty();
        }

        Self {
            p50: value_at_quantile(durations, 0.50),
            p95: value_at_quantile(durations, 0.95),
            p99: value_at_quantile(durations, 0.99),
        }
    }

    /// All-zero placeholder used when the window holds no events.
    pub fn empty() -> Self {
        Self { p50: 0, p95: 0, p99: 0 }
    }
}

/// Value at rank `floor(n × q)`, clamped to the last index.
fn value_at_quantile(sorted: &[u64], q: f64) -> u64 {
    let idx = ((sorted.len() as f64 * q) as usize).min(sorted.len() - 1);
    sorted[idx]
}
