//! Tracing configuration for harness operations.
//!
//! [`TracingConfig`] controls the level of the spans the harness opens around
//! scenarios and requests, and whether scenario timing events are recorded.

use tracing::Level;

/// Controls tracing span levels and scenario timing.
///
/// By default, scenario spans are emitted at `INFO` level and request spans
/// at `DEBUG`. Scenario timing is disabled.
///
/// # Examples
///
/// ```
/// use pubprobe::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_scenario_level(Level::DEBUG)
///     .with_scenario_timing(true);
/// let _ = config;
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
    pub(crate) scenario_level: Level,
    pub(crate) request_level: Level,
    pub(crate) scenario_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            scenario_level: Level::INFO,
            request_level: Level::DEBUG,
            scenario_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the level of the span wrapping each scenario.
    #[must_use]
    pub fn with_scenario_level(mut self, level: Level) -> Self {
        self.scenario_level = level;
        self
    }

    /// Set the level of the span wrapping each request.
    #[must_use]
    pub fn with_request_level(mut self, level: Level) -> Self {
        self.request_level = level;
        self
    }

    /// Enable or disable the `elapsed_us` event emitted when a scenario
    /// produces its verdict.
    #[must_use]
    pub fn with_scenario_timing(mut self, enabled: bool) -> Self {
        self.scenario_timing = enabled;
        self
    }

    /// Set every span to `level`.
    #[must_use]
    pub fn with_all_levels(self, level: Level) -> Self {
        self.with_scenario_level(level).with_request_level(level)
    }
}
