//! gangplank-metrics — observability for the scheduling pipeline.
//!
//! Tracks how long each scheduling attempt takes and how it ended, and
//! provides Prometheus-compatible text exposition.
//!
//! # Architecture
//!
//! ```text
//! SchedulerMetrics
//!   ├── record_attempt()        ← called once per scheduling attempt
//!   ├── record_label_defaults() ← called when unit labels fall back to 0
//!   └── attempt_latency()       → histogram snapshot
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod collector;
pub mod prometheus;

pub use collector::{Histogram, HistogramSnapshot, Outcome, SchedulerMetrics};
pub use prometheus::render_prometheus;
