//! Prometheus text exposition format.
//!
//! Renders [`SchedulerMetrics`] for scraping by a Prometheus server or
//! compatible agent.

use std::fmt::Write;

use crate::collector::{Outcome, SchedulerMetrics};

/// Render scheduler metrics into Prometheus text format.
pub fn render_prometheus(metrics: &SchedulerMetrics) -> String {
    let mut out = String::new();
    let latency = metrics.attempt_latency();

    out.push_str("# HELP gangplank_scheduling_attempt_seconds Duration of one scheduling attempt.\n");
    out.push_str("# TYPE gangplank_scheduling_attempt_seconds histogram\n");
    for (bound, count) in &latency.buckets {
        let _ = writeln!(
            out,
            "gangplank_scheduling_attempt_seconds_bucket{{le=\"{}\"}} {count}",
            format_bound(*bound)
        );
    }
    let _ = writeln!(
        out,
        "gangplank_scheduling_attempt_seconds_bucket{{le=\"+Inf\"}} {}",
        latency.count
    );
    let _ = writeln!(out, "gangplank_scheduling_attempt_seconds_sum {}", latency.sum_seconds);
    let _ = writeln!(out, "gangplank_scheduling_attempt_seconds_count {}", latency.count);

    out.push_str("# HELP gangplank_scheduling_attempts_total Scheduling attempts by outcome.\n");
    out.push_str("# TYPE gangplank_scheduling_attempts_total counter\n");
    for outcome in Outcome::ALL {
        let _ = writeln!(
            out,
            "gangplank_scheduling_attempts_total{{outcome=\"{}\"}} {}",
            outcome.label(),
            metrics.outcome_count(outcome)
        );
    }

    out.push_str("# HELP gangplank_label_defaults_total Resource labels that were missing, unparsable or out of range.\n");
    out.push_str("# TYPE gangplank_label_defaults_total counter\n");
    let _ = writeln!(out, "gangplank_label_defaults_total {}", metrics.label_defaults());

    out
}

/// Bucket bound as a label value. Whole numbers keep one decimal place
/// (`1.0`, `10.0`) to match the series names client libraries produce.
fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.is_finite() {
        format!("{bound:.1}")
    } else {
        bound.to_string()
    }
}
