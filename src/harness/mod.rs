//! Scenario runtime.
//!
//! A [`Harness`] owns a shared client, the run configuration, and the pacer.
//! Each scenario runs on its own tokio task, wired to a fresh verdict slot:
//! the task issues its requests, settles each response pair into a tagged
//! [`Delivery`], evaluates it, and writes exactly one outcome. The caller
//! waits on the completion side of the slot and receives the [`Verdict`].
//!
//! Scenario methods live in submodules: publish checks in `publish`,
//! chained and batched history checks in `history`, and server time in
//! `time`.

use std::{future::Future, sync::Arc, time::Instant};

use futures::FutureExt;
use tracing::{Instrument, Span};

use crate::{
    channels::{Delivery, ResponseChannels},
    client::{Operation, PubSubClient, Request},
    completion::verdict_slot,
    config::HarnessConfig,
    error::{ConfigError, Failure},
    expectation::Expectation,
    metrics,
    pacing::{IntervalPacer, Pacer, Pause},
    parser,
    relay,
    tracing_helpers::{
        emit_timing_event,
        record_verdict,
        request_span,
        scenario_span,
        timing_start,
    },
    verdict::Verdict,
};

mod history;
mod publish;
mod time;

pub use history::TimeWindow;

/// Runs verification scenarios against a [`PubSubClient`].
///
/// Cloning a harness is cheap; clones share the client, configuration, and
/// pacer.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use pubprobe::{Harness, HarnessConfig, PubSubClient, assert_passed};
///
/// # async fn run<C: PubSubClient + 'static>(client: Arc<C>) -> Result<(), pubprobe::ConfigError> {
/// let harness = Harness::new(client, HarnessConfig::default().with_cipher_key("enigma"))?;
/// let verdict = harness.publish_then_fetch("EncryptedDetailedHistory", "Test Message").await;
/// assert_passed(&verdict);
/// # Ok(())
/// # }
/// ```
pub struct Harness<C: ?Sized> {
    client: Arc<C>,
    config: Arc<HarnessConfig>,
    pacer: Arc<dyn Pacer>,
}

impl<C: ?Sized> Clone for Harness<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
            pacer: Arc::clone(&self.pacer),
        }
    }
}

impl<C> Harness<C>
where
    C: PubSubClient + ?Sized + 'static,
{
    /// Create a harness paced by an [`IntervalPacer`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(client: Arc<C>, config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pacer = Arc::new(IntervalPacer::from_config(&config));
        Ok(Self {
            client,
            config: Arc::new(config),
            pacer,
        })
    }

    /// Replace the pacer.
    #[must_use]
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Arc::new(pacer);
        self
    }

    /// The client under test.
    #[must_use]
    pub fn client(&self) -> &Arc<C> { &self.client }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig { &self.config }

    /// Yield to the pacer.
    pub async fn pause(&self, pause: Pause) { self.pacer.pause(pause).await; }

    /// Issue `request` and return its response pair unsettled.
    pub fn issue(&self, request: &Request) -> ResponseChannels {
        metrics::inc_requests(request.operation());
        tracing::debug!(
            operation = %request.operation(),
            channel = request.channel().unwrap_or_default(),
            "issuing request"
        );
        self.client.dispatch(request)
    }

    /// Settle a response pair and evaluate it against `expectation`.
    ///
    /// Success payloads go through the parser stage, error payloads through
    /// the error relay, and a pair that closes without data is a
    /// [`Failure::EmptyStream`].
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] that decides the scenario.
    pub async fn resolve(
        &self,
        operation: Operation,
        channels: ResponseChannels,
        expectation: &Expectation,
    ) -> Result<(), Failure> {
        match channels.settle().await {
            None => Err(Failure::EmptyStream(operation)),
            Some(Delivery::Success(raw)) => parser::evaluate(
                self.client.as_ref(),
                &raw,
                self.config.cipher_key(),
                expectation,
            ),
            Some(Delivery::Failure(raw)) => relay::relay_error(&raw, expectation.expected_error()),
        }
    }

    /// Issue `request` and evaluate its response against `expectation`.
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] that decides the scenario.
    pub async fn request(
        &self,
        request: &Request,
        expectation: &Expectation,
    ) -> Result<(), Failure> {
        let span = request_span(&self.config.tracing, request);
        async {
            let channels = self.issue(request);
            self.resolve(request.operation(), channels, expectation).await
        }
        .instrument(span)
        .await
    }

    /// Issue `request` and settle its response pair without evaluating it.
    ///
    /// Used where the scenario inspects the delivery itself, such as a chained
    /// publish or a time snapshot.
    pub async fn exchange(&self, request: &Request) -> Option<Delivery> {
        let span = request_span(&self.config.tracing, request);
        async { self.issue(request).settle().await }
            .instrument(span)
            .await
    }

    /// Run `body` as a scenario named `name` and wait for its verdict.
    ///
    /// `body` receives a clone of the harness and runs on its own task. If
    /// the task panics, the scenario fails with [`Failure::Abandoned`].
    pub async fn run_scenario<F, Fut>(&self, name: &str, body: F) -> Verdict
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<(), Failure>> + Send + 'static,
    {
        let (sender, waiter) = verdict_slot(name);
        let span = scenario_span(&self.config.tracing, name);
        let started = timing_start(&self.config.tracing);
        let task = body(self.clone()).map(move |outcome| {
            if !sender.send(outcome) {
                tracing::debug!("verdict waiter dropped before completion");
            }
        });
        tokio::spawn(task.instrument(span.clone()));

        let verdict = waiter.wait().await;
        self.finish(&span, &verdict, started);
        verdict
    }

    /// Log and count a verdict inside its scenario span.
    fn finish(&self, span: &Span, verdict: &Verdict, started: Option<Instant>) {
        span.in_scope(|| {
            record_verdict(span, verdict);
            emit_timing_event(&self.config.tracing, started);
        });
        metrics::inc_verdicts(verdict.is_passed());
    }
}
