//! Verdict slot and completion waiter.
//!
//! [`verdict_slot`] creates a one-shot slot per scenario. The producing task
//! owns the [`VerdictSender`], which is consumed by [`VerdictSender::send`],
//! so at most one verdict can ever be written. The [`CompletionWaiter`]
//! blocks the test until that verdict arrives.

use tokio::sync::oneshot;

use crate::{error::Failure, verdict::Verdict};

/// Create the verdict slot for `scenario`.
#[must_use]
pub fn verdict_slot(scenario: impl Into<String>) -> (VerdictSender, CompletionWaiter) {
    let scenario = scenario.into();
    let (tx, rx) = oneshot::channel();
    (
        VerdictSender {
            scenario: scenario.clone(),
            tx,
        },
        CompletionWaiter { scenario, rx },
    )
}

/// Writing half of a verdict slot.
#[derive(Debug)]
pub struct VerdictSender {
    scenario: String,
    tx: oneshot::Sender<Verdict>,
}

impl VerdictSender {
    /// Name of the scenario this slot belongs to.
    #[must_use]
    pub fn scenario(&self) -> &str { &self.scenario }

    /// Write the scenario outcome.
    ///
    /// Returns `false` if the waiter has already gone away; the verdict is
    /// then discarded.
    pub fn send(self, outcome: Result<(), Failure>) -> bool {
        let verdict = Verdict::new(self.scenario, outcome);
        self.tx.send(verdict).is_ok()
    }
}

/// Reading half of a verdict slot.
#[derive(Debug)]
pub struct CompletionWaiter {
    scenario: String,
    rx: oneshot::Receiver<Verdict>,
}

impl CompletionWaiter {
    /// Wait for the scenario's verdict.
    ///
    /// If the sender is dropped without writing (for example because the
    /// producing task panicked), the scenario fails with
    /// [`Failure::Abandoned`].
    pub async fn wait(self) -> Verdict {
        match self.rx.await {
            Ok(verdict) => verdict,
            Err(_) => {
                tracing::warn!(scenario = %self.scenario, "verdict sender dropped");
                Verdict::failed(self.scenario, Failure::Abandoned)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiter_receives_the_written_verdict() {
        let (sender, waiter) = verdict_slot("Time");
        tokio::spawn(async move { sender.send(Ok(())) });
        assert_eq!(waiter.wait().await, Verdict::passed("Time"));
    }

    #[tokio::test]
    async fn dropped_sender_fails_the_scenario() {
        let (sender, waiter) = verdict_slot("Time");
        let producer = tokio::spawn(async move {
            let _sender = sender;
            panic!("producer failed");
        });
        assert!(producer.await.is_err());
        assert_eq!(
            waiter.wait().await,
            Verdict::failed("Time", Failure::Abandoned)
        );
    }

    #[tokio::test]
    async fn send_reports_a_missing_waiter() {
        let (sender, waiter) = verdict_slot("Time");
        drop(waiter);
        assert!(!sender.send(Ok(())));
    }
}
