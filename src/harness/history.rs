//! History scenarios: publish-then-fetch chaining, detailed batches, and
//! time-windowed fetches.

use tracing::Instrument;

use super::Harness;
use crate::{
    channels::Delivery,
    client::{HistoryQuery, Operation, PubSubClient, Request},
    completion::verdict_slot,
    envelope::PUBLISH_SUCCESS_STATUS,
    error::Failure,
    expectation::{Expectation, SequenceSpec},
    pacing::Pause,
    relay,
    tracing_helpers::scenario_span,
    verdict::Verdict,
};

/// Timetoken bounds `[start, end)` of one published batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    /// Server time taken before the batch.
    pub start: u64,
    /// Server time taken after the batch.
    pub end: u64,
    /// Index of the first message of the batch.
    pub first_index: usize,
}

impl<C> Harness<C>
where
    C: PubSubClient + ?Sized + 'static,
{
    /// Publish `message`; once the publish is acknowledged, fetch the newest
    /// message and expect it to contain `message`.
    ///
    /// Any success payload counts as the acknowledgement. The history fetch
    /// is decoded with the configured cipher key.
    pub async fn publish_then_fetch(&self, name: &str, message: &str) -> Verdict {
        let message = message.to_owned();
        self.run_scenario(name, move |harness| async move {
            harness.chain_publish_fetch(&message).await
        })
        .await
    }

    async fn chain_publish_fetch(&self, message: &str) -> Result<(), Failure> {
        let publish = Request::publish(self.config.channel(), message);
        match self.exchange(&publish).await {
            None => Err(Failure::EmptyStream(Operation::Publish)),
            Some(Delivery::Failure(raw)) => relay::relay_error(&raw, None),
            Some(Delivery::Success(ack)) => {
                tracing::debug!(ack = %ack.text(), "publish acknowledged; fetching newest message");
                let fetch = Request::History(HistoryQuery::new(self.config.channel(), 1));
                self.request(&fetch, &Expectation::contains(message)).await
            }
        }
    }

    /// Publish the configured history batch, then fetch the same number of
    /// messages and expect exactly that batch, in order.
    pub async fn history_batch(&self, name: &str) -> Verdict {
        self.run_scenario(name, |harness| async move { harness.publish_and_fetch_batch().await })
            .await
    }

    async fn publish_and_fetch_batch(&self) -> Result<(), Failure> {
        let count = self.config.history_batch();
        self.publish_batch(0, count).await?;
        let fetch = Request::History(HistoryQuery::new(self.config.channel(), count));
        let expected = SequenceSpec::new(self.config.message_prefix(), 0, count);
        self.request(&fetch, &Expectation::Sequence(expected)).await
    }

    /// Publish `count` messages `prefix + index` for index `start..start +
    /// count`, pausing after each, and wait for every acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`Failure::Unacknowledged`] if any publish was not
    /// acknowledged with [`PUBLISH_SUCCESS_STATUS`].
    pub async fn publish_batch(&self, start: usize, count: usize) -> Result<usize, Failure> {
        let acknowledgement = Expectation::acknowledged(PUBLISH_SUCCESS_STATUS);
        let mut acknowledged = 0usize;
        for index in start..start + count {
            let message = format!("{}{index}", self.config.message_prefix());
            let request = Request::publish(self.config.channel(), message);
            match self.request(&request, &acknowledgement).await {
                Ok(()) => acknowledged += 1,
                Err(failure) => tracing::warn!(index, %failure, "publish not acknowledged"),
            }
            self.pause(Pause::BetweenPublishes).await;
        }
        if acknowledged == count {
            Ok(acknowledged)
        } else {
            Err(Failure::Unacknowledged {
                expected: count,
                acknowledged,
            })
        }
    }

    /// Publish two batches between three server time snapshots and fetch
    /// each window separately.
    ///
    /// Returns one verdict per window, earlier window first. Both verdicts
    /// carry `name`. A failed time snapshot fails both windows; a batch that
    /// was not fully acknowledged fails only its own window.
    pub async fn time_windowed_history(&self, name: &str) -> [Verdict; 2] {
        let (earlier_tx, earlier) = verdict_slot(name);
        let (later_tx, later) = verdict_slot(name);
        let span = scenario_span(&self.config.tracing, name);
        let harness = self.clone();
        let task = async move {
            match harness.publish_windows().await {
                Err(failure) => {
                    earlier_tx.send(Err(failure.clone()));
                    later_tx.send(Err(failure));
                }
                Ok(windows) => {
                    for (sender, window) in [earlier_tx, later_tx].into_iter().zip(windows) {
                        let outcome = match window {
                            Ok(window) => harness.fetch_window(&window).await,
                            Err(failure) => Err(failure),
                        };
                        sender.send(outcome);
                    }
                }
            }
        };
        tokio::spawn(task.instrument(span.clone()));

        let verdicts = [earlier.wait().await, later.wait().await];
        for verdict in &verdicts {
            self.finish(&span, verdict, None);
        }
        verdicts
    }

    async fn publish_windows(&self) -> Result<[Result<TimeWindow, Failure>; 2], Failure> {
        let count = self.config.window_batch();
        let before = self.server_time().await?;
        let earlier = self.publish_batch(0, count).await;
        let middle = self.server_time().await?;
        let later = self.publish_batch(count, count).await;
        let after = self.server_time().await?;
        tracing::debug!(before, middle, after, "time windows captured");
        Ok([
            earlier.map(|_| TimeWindow {
                start: before,
                end: middle,
                first_index: 0,
            }),
            later.map(|_| TimeWindow {
                start: middle,
                end: after,
                first_index: count,
            }),
        ])
    }

    /// Fetch the messages published inside `window` and expect exactly that
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] that decides the window's verdict.
    pub async fn fetch_window(&self, window: &TimeWindow) -> Result<(), Failure> {
        let count = self.config.window_batch();
        let query =
            HistoryQuery::new(self.config.channel(), count).between(window.start, window.end);
        let expected = SequenceSpec::new(self.config.message_prefix(), window.first_index, count);
        self.request(&Request::History(query), &Expectation::Sequence(expected))
            .await
    }
}
