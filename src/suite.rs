//! Grouping scenarios into suites.
//!
//! A [`Suite`] runs scenarios one after another under a banner, yields to
//! the pacer between them, and collects their verdicts into a [`Report`].

use std::future::Future;

use serde::Serialize;

use crate::{
    client::PubSubClient,
    harness::Harness,
    pacing::Pause,
    verdict::{Verdict, assert_passed},
};

/// Verdicts collected by a suite.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    verdicts: Vec<Verdict>,
}

impl Report {
    /// Add a verdict.
    pub fn record(&mut self, verdict: Verdict) { self.verdicts.push(verdict); }

    /// All verdicts, in the order they were recorded.
    #[must_use]
    pub fn verdicts(&self) -> &[Verdict] { &self.verdicts }

    /// Number of passing verdicts.
    #[must_use]
    pub fn passed(&self) -> usize { self.verdicts.iter().filter(|v| v.is_passed()).count() }

    /// Number of failing verdicts.
    #[must_use]
    pub fn failed(&self) -> usize { self.verdicts.len() - self.passed() }

    /// The failing verdicts.
    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.is_passed())
    }

    /// Summarize the report for machine-readable output.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            passed: self.passed(),
            failed: self.failed(),
            failures: self.failures().map(ToString::to_string).collect(),
        }
    }

    /// Fail the enclosing test on the first failing verdict.
    ///
    /// # Panics
    ///
    /// Panics with the verdict line of the first failing scenario.
    #[track_caller]
    pub fn assert_all_passed(&self) {
        if let Some(verdict) = self.failures().next() {
            assert_passed(verdict);
        }
    }
}

/// Serializable digest of a [`Report`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Number of passing verdicts.
    pub passed: usize,
    /// Number of failing verdicts.
    pub failed: usize,
    /// Verdict lines of the failing scenarios.
    pub failures: Vec<String>,
}

/// A named group of scenarios sharing one harness.
pub struct Suite<'h, C: ?Sized> {
    name: String,
    harness: &'h Harness<C>,
    report: Report,
}

impl<'h, C> Suite<'h, C>
where
    C: PubSubClient + ?Sized + 'static,
{
    /// Start a suite and log its opening banner.
    #[must_use]
    pub fn begin(harness: &'h Harness<C>, name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::info!(suite = %name, "=========={name} tests start==========");
        Self {
            name,
            harness,
            report: Report::default(),
        }
    }

    /// Run a scenario producing one verdict, then pause for the scenario
    /// cooldown.
    pub async fn run<F, Fut>(&mut self, scenario: F) -> Verdict
    where
        F: FnOnce(&'h Harness<C>) -> Fut,
        Fut: Future<Output = Verdict>,
    {
        let verdict = scenario(self.harness).await;
        self.report.record(verdict.clone());
        self.harness.pause(Pause::BetweenScenarios).await;
        verdict
    }

    /// Run a scenario producing several verdicts, then pause for the
    /// scenario cooldown.
    pub async fn run_many<F, Fut, I>(&mut self, scenario: F)
    where
        F: FnOnce(&'h Harness<C>) -> Fut,
        Fut: Future<Output = I>,
        I: IntoIterator<Item = Verdict>,
    {
        for verdict in scenario(self.harness).await {
            self.report.record(verdict);
        }
        self.harness.pause(Pause::BetweenScenarios).await;
    }

    /// Log the closing banner and return the collected verdicts.
    #[must_use]
    pub fn finish(self) -> Report {
        tracing::info!(
            suite = %self.name,
            passed = self.report.passed(),
            failed = self.report.failed(),
            "=========={} tests end==========",
            self.name
        );
        self.report
    }
}
