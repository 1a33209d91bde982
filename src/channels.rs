//! Per-request response channel pairs.
//!
//! A client answers every request on a fresh pair of channels: one for
//! success payloads and one for error payloads. [`response_pair`] creates the
//! pair; the client keeps the [`ResponseSender`] and hands
//! [`ResponseChannels`] back to the harness.
//!
//! [`ResponseChannels::settle`] collapses the pair into a single tagged
//! [`Delivery`]: the first non-sentinel payload seen on either channel. Once
//! settled, both receivers are dropped, so a client still holding the sender
//! observes the closure and stops.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::envelope::RawResponse;

/// Capacity of each response channel.
///
/// One slot keeps a client from running ahead of the harness, which is the
/// closest bounded analogue of an unbuffered hand-off.
pub const RESPONSE_CAPACITY: usize = 1;

/// The first usable payload of a response pair, tagged by the channel it
/// arrived on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Payload from the success channel.
    Success(RawResponse),
    /// Payload from the error channel.
    Failure(RawResponse),
}

/// Returned when the harness has already dropped its side of a pair.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("response channels closed by the receiver")]
pub struct ResponseClosed;

/// Client-side half of a response pair.
#[derive(Debug)]
pub struct ResponseSender {
    success: mpsc::Sender<RawResponse>,
    error: mpsc::Sender<RawResponse>,
}

impl ResponseSender {
    /// Deliver a payload on the success channel.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseClosed`] if the harness is no longer listening.
    pub async fn succeed(&self, raw: impl Into<RawResponse>) -> Result<(), ResponseClosed> {
        self.success.send(raw.into()).await.map_err(|_| ResponseClosed)
    }

    /// Deliver a payload on the error channel.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseClosed`] if the harness is no longer listening.
    pub async fn fail(&self, raw: impl Into<RawResponse>) -> Result<(), ResponseClosed> {
        self.error.send(raw.into()).await.map_err(|_| ResponseClosed)
    }

    /// Emit the empty-array sentinel on the success channel.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseClosed`] if the harness is no longer listening.
    pub async fn keep_alive(&self) -> Result<(), ResponseClosed> {
        self.succeed(RawResponse::empty_sentinel()).await
    }

    /// Returns `true` once the harness has dropped its receivers.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.success.is_closed() && self.error.is_closed() }
}

/// Harness-side half of a response pair.
#[derive(Debug)]
pub struct ResponseChannels {
    success: mpsc::Receiver<RawResponse>,
    error: mpsc::Receiver<RawResponse>,
}

/// Create a connected response pair.
#[must_use]
pub fn response_pair() -> (ResponseSender, ResponseChannels) {
    let (success_tx, success_rx) = mpsc::channel(RESPONSE_CAPACITY);
    let (error_tx, error_rx) = mpsc::channel(RESPONSE_CAPACITY);
    (
        ResponseSender {
            success: success_tx,
            error: error_tx,
        },
        ResponseChannels {
            success: success_rx,
            error: error_rx,
        },
    )
}

impl ResponseChannels {
    /// Wait for the first usable payload on either channel.
    ///
    /// Sentinels are skipped on both channels. A channel that closes stops
    /// being polled; the other one is still awaited. Returns `None` once both
    /// channels have closed without a usable payload.
    ///
    /// Clients answer a request on exactly one channel. Should both channels
    /// hold a payload at the same time, the success channel is read first.
    pub async fn settle(self) -> Option<Delivery> {
        let Self {
            mut success,
            mut error,
        } = self;
        let mut success_open = true;
        let mut error_open = true;
        let mut skipped = 0usize;

        loop {
            tokio::select! {
                biased;
                item = success.recv(), if success_open => match item {
                    Some(raw) if raw.is_empty_sentinel() => skipped += 1,
                    Some(raw) => return Some(Delivery::Success(raw)),
                    None => success_open = false,
                },
                item = error.recv(), if error_open => match item {
                    Some(raw) if raw.is_empty_sentinel() => skipped += 1,
                    Some(raw) => return Some(Delivery::Failure(raw)),
                    None => error_open = false,
                },
                else => {
                    tracing::debug!(
                        sentinels.skipped = skipped,
                        "response channels closed without data"
                    );
                    return None;
                }
            }
        }
    }
}
