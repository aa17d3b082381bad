//! Scheduler metrics — attempt latency histogram and outcome counters.
//!
//! Recording is lock-free: every bucket and counter is an atomic, so the
//! scheduling loop never waits on a scrape.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Prometheus client default buckets, in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// How a scheduling attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Scheduled,
    InsufficientClusterCapacity,
    NoCapacityAvailable,
    UnsupportedRole,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Scheduled,
        Outcome::InsufficientClusterCapacity,
        Outcome::NoCapacityAvailable,
        Outcome::UnsupportedRole,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Scheduled => "scheduled",
            Outcome::InsufficientClusterCapacity => "insufficient_cluster_capacity",
            Outcome::NoCapacityAvailable => "no_capacity_available",
            Outcome::UnsupportedRole => "unsupported_role",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// A cumulative histogram with fixed upper bounds.
pub struct Histogram {
    bounds: Vec<f64>,
    /// Non-cumulative count per bucket, plus a trailing `+Inf` bucket.
    buckets: Vec<AtomicU64>,
    count: AtomicU64,
    /// Sum of observations in nanoseconds.
    sum_nanos: AtomicU64,
}

/// Point-in-time view of a [`Histogram`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` pairs, excluding `+Inf`.
    pub buckets: Vec<(f64, u64)>,
    pub count: u64,
    pub sum_seconds: f64,
}

impl Histogram {
    pub fn new(bounds: &[f64]) -> Self {
        let mut bounds = bounds.to_vec();
        bounds.sort_by(|a, b| a.total_cmp(b));
        let buckets = (0..=bounds.len()).map(|_| AtomicU64::new(0)).collect();
        Self {
            bounds,
            buckets,
            count: AtomicU64::new(0),
            sum_nanos: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        let idx = self
            .bounds
            .iter()
            .position(|&b| secs <= b)
            .unwrap_or(self.bounds.len());
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.sum_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut cumulative = 0;
        let buckets = self
            .bounds
            .iter()
            .zip(&self.buckets)
            .map(|(&bound, n)| {
                cumulative += n.load(Ordering::Relaxed);
                (bound, cumulative)
            })
            .collect();

        HistogramSnapshot {
            buckets,
            count: self.count.load(Ordering::Relaxed),
            sum_seconds: self.sum_nanos.load(Ordering::Relaxed) as f64 / 1e9,
        }
    }
}

/// All measurements the scheduling pipeline exposes.
pub struct SchedulerMetrics {
    attempt_latency: Histogram,
    outcomes: [AtomicU64; 4],
    label_defaults: AtomicU64,
}

impl SchedulerMetrics {
    pub fn new() -> Self {
        Self {
            attempt_latency: Histogram::new(&DEFAULT_BUCKETS),
            outcomes: Default::default(),
            label_defaults: AtomicU64::new(0),
        }
    }

    /// Record one finished scheduling attempt.
    pub fn record_attempt(&self, outcome: Outcome, elapsed: Duration) {
        self.attempt_latency.observe(elapsed);
        self.outcomes[outcome.slot()].fetch_add(1, Ordering::Relaxed);
    }

    /// Count resource labels that fell back to zero.
    pub fn record_label_defaults(&self, n: usize) {
        if n > 0 {
            self.label_defaults.fetch_add(n as u64, Ordering::Relaxed);
        }
    }

    pub fn attempt_latency(&self) -> HistogramSnapshot {
        self.attempt_latency.snapshot()
    }

    pub fn outcome_count(&self, outcome: Outcome) -> u64 {
        self.outcomes[outcome.slot()].load(Ordering::Relaxed)
    }

    pub fn label_defaults(&self) -> u64 {
        self.label_defaults.load(Ordering::Relaxed)
    }
}

impl Default for SchedulerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
