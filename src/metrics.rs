//! Metric helpers for `pubprobe`.
//!
//! This module defines metric names and helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

use crate::client::Operation;

/// Name of the counter tracking verdicts by outcome.
pub const VERDICTS_TOTAL: &str = "pubprobe_verdicts_total";
/// Name of the counter tracking issued requests by operation.
pub const REQUESTS_TOTAL: &str = "pubprobe_requests_total";

/// Record a verdict.
pub fn inc_verdicts(passed: bool) {
    #[cfg(feature = "metrics")]
    metrics::counter!(VERDICTS_TOTAL, "outcome" => if passed { "passed" } else { "failed" })
        .increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = passed;
}

/// Record an issued request.
pub fn inc_requests(operation: Operation) {
    #[cfg(feature = "metrics")]
    metrics::counter!(REQUESTS_TOTAL, "operation" => operation.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = operation;
}
