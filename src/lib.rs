//! Public API for the `pubprobe` library.
//!
//! `pubprobe` verifies asynchronous pub/sub clients. It issues publish,
//! history, and server-time requests through a [`PubSubClient`], settles each
//! request's success/error channel pair into a single tagged [`Delivery`],
//! and folds the result into one [`Verdict`] per scenario.

pub mod channels;
pub mod cipher;
pub mod client;
pub mod completion;
pub mod config;
pub mod envelope;
pub mod error;
pub mod expectation;
pub mod harness;
pub mod metrics;
pub mod pacing;
pub mod parser;
pub mod relay;
pub mod suite;
pub mod tracing_config;
mod tracing_helpers;
pub mod verdict;

pub use channels::{Delivery, ResponseChannels, ResponseClosed, ResponseSender, response_pair};
pub use cipher::CipherKey;
pub use client::{EnvelopeDecoder, HistoryQuery, Operation, PubSubClient, Request};
pub use completion::{CompletionWaiter, VerdictSender, verdict_slot};
pub use config::HarnessConfig;
pub use envelope::{
    DecodedEnvelope,
    DecodedPayload,
    EMPTY_SENTINEL,
    INVALID_MESSAGE_STATUS,
    MESSAGE_TOO_LARGE_STATUS,
    PUBLISH_SUCCESS_STATUS,
    RawResponse,
};
pub use error::{ConfigError, DecodeError, Failure, VerdictError};
pub use expectation::{Expectation, SequenceSpec};
pub use harness::{Harness, TimeWindow};
pub use metrics::{REQUESTS_TOTAL, VERDICTS_TOTAL};
pub use pacing::{IntervalPacer, NoPacing, Pacer, Pause, RateLimitPacer};
pub use suite::{Report, ReportSummary, Suite};
pub use tracing_config::TracingConfig;
pub use verdict::{Verdict, assert_passed};
