//! Injected pacing between publishes and scenarios.
//!
//! Services index messages by arrival time, so batches are published with a
//! gap between messages and suites leave a cooldown between scenarios. The
//! gaps are a [`Pacer`] the harness carries rather than hard-coded sleeps:
//! [`IntervalPacer`] sleeps on tokio time (and therefore runs instantly under
//! `tokio::time::pause`), [`RateLimitPacer`] caps publish throughput with a
//! leaky bucket, and [`NoPacing`] never waits.

use std::time::Duration;

use async_trait::async_trait;
use leaky_bucket::RateLimiter;

use crate::config::HarnessConfig;

/// Point in a run where the harness yields to its pacer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pause {
    /// After each publish of a batch.
    BetweenPublishes,
    /// After each scenario of a suite.
    BetweenScenarios,
}

/// Decides how long the harness waits at each [`Pause`].
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait before continuing past `pause`.
    async fn pause(&self, pause: Pause);
}

/// Sleeps for a fixed interval at each pause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalPacer {
    publish_interval: Duration,
    scenario_cooldown: Duration,
}

impl IntervalPacer {
    /// Sleep `publish_interval` between publishes and `scenario_cooldown`
    /// between scenarios.
    #[must_use]
    pub fn new(publish_interval: Duration, scenario_cooldown: Duration) -> Self {
        Self {
            publish_interval,
            scenario_cooldown,
        }
    }

    /// Use the intervals from `config`.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.publish_interval, config.scenario_cooldown)
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn pause(&self, pause: Pause) {
        let interval = match pause {
            Pause::BetweenPublishes => self.publish_interval,
            Pause::BetweenScenarios => self.scenario_cooldown,
        };
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
}

/// Caps publishes at a fixed rate per second; scenarios are not delayed.
pub struct RateLimitPacer {
    limiter: RateLimiter,
}

impl RateLimitPacer {
    /// Allow at most `rate` publishes per second, with no initial burst
    /// beyond one.
    #[must_use]
    pub fn per_second(rate: usize) -> Self {
        let rate = rate.max(1);
        Self {
            limiter: RateLimiter::builder()
                .initial(1)
                .refill(rate)
                .interval(Duration::from_secs(1))
                .max(rate)
                .build(),
        }
    }
}

#[async_trait]
impl Pacer for RateLimitPacer {
    async fn pause(&self, pause: Pause) {
        if pause == Pause::BetweenPublishes {
            self.limiter.acquire(1).await;
        }
    }
}

/// Never waits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self, _pause: Pause) {}
}
