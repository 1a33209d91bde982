//! Scenario verdicts and the assertion sink.
//!
//! A [`Verdict`] pairs a scenario name with its outcome. Its `Display` form
//! is the line test runners print: `Test '<name>': passed.` or
//! `Test '<name>': failed. <reason>`.

use std::fmt;

use crate::error::{Failure, VerdictError};

/// Final outcome of one scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    scenario: String,
    outcome: Result<(), Failure>,
}

impl Verdict {
    /// Build a verdict from a scenario outcome.
    #[must_use]
    pub fn new(scenario: impl Into<String>, outcome: Result<(), Failure>) -> Self {
        Self {
            scenario: scenario.into(),
            outcome,
        }
    }

    /// A passing verdict.
    #[must_use]
    pub fn passed(scenario: impl Into<String>) -> Self { Self::new(scenario, Ok(())) }

    /// A failing verdict.
    #[must_use]
    pub fn failed(scenario: impl Into<String>, failure: Failure) -> Self {
        Self::new(scenario, Err(failure))
    }

    /// Name of the scenario this verdict belongs to.
    #[must_use]
    pub fn scenario(&self) -> &str { &self.scenario }

    /// The scenario outcome.
    #[must_use]
    pub fn outcome(&self) -> &Result<(), Failure> { &self.outcome }

    /// Returns `true` if the scenario passed.
    #[must_use]
    pub fn is_passed(&self) -> bool { self.outcome.is_ok() }

    /// The failure reason, if the scenario failed.
    #[must_use]
    pub fn failure(&self) -> Option<&Failure> { self.outcome.as_ref().err() }

    /// Convert into a `Result` for callers that propagate with `?`.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError`] wrapping this verdict if the scenario failed.
    pub fn into_result(self) -> Result<(), VerdictError> {
        if self.is_passed() {
            Ok(())
        } else {
            Err(VerdictError(self))
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(()) => write!(f, "Test '{}': passed.", self.scenario),
            Err(failure) => write!(f, "Test '{}': failed. {failure}", self.scenario),
        }
    }
}

/// Fail the enclosing test unless `verdict` passed.
///
/// # Panics
///
/// Panics with the verdict line if the scenario failed.
#[track_caller]
pub fn assert_passed(verdict: &Verdict) {
    assert!(verdict.is_passed(), "{verdict}");
}
