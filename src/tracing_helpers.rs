//! Span and event helpers for harness operations.
//!
//! These keep span construction with a dynamic level out of the scenario
//! code.

use std::time::Instant;

use tracing::{Level, Span};

use crate::{client::Request, tracing_config::TracingConfig, verdict::Verdict};

/// Create a tracing span at a dynamically selected level.
///
/// Each branch calls the matching `tracing::<level>_span!` macro so the span
/// metadata stays static per branch.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

/// Create the span wrapping one scenario.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn scenario_span(config: &TracingConfig, name: &str) -> Span {
    dynamic_span!(
        config.scenario_level,
        "scenario.run",
        scenario.name = name,
        result = tracing::field::Empty
    )
}

/// Create the span wrapping one request and its settlement.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn request_span(config: &TracingConfig, request: &Request) -> Span {
    dynamic_span!(
        config.request_level,
        "client.request",
        operation = request.operation().as_str(),
        channel = request.channel().unwrap_or_default()
    )
}

/// Log a verdict and record it on the scenario span.
pub(crate) fn record_verdict(span: &Span, verdict: &Verdict) {
    span.record("result", if verdict.is_passed() { "passed" } else { "failed" });
    match verdict.failure() {
        None => tracing::info!(scenario = verdict.scenario(), "{verdict}"),
        Some(failure) => tracing::warn!(
            scenario = verdict.scenario(),
            reason = %failure,
            "{verdict}"
        ),
    }
}

/// Emit the scenario timing event if enabled.
pub(crate) fn emit_timing_event(config: &TracingConfig, started: Option<Instant>) {
    if let (true, Some(started)) = (config.scenario_timing, started) {
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        tracing::debug!(elapsed_us, "scenario complete");
    }
}

/// Capture the start time when scenario timing is enabled.
pub(crate) fn timing_start(config: &TracingConfig) -> Option<Instant> {
    config.scenario_timing.then(Instant::now)
}
