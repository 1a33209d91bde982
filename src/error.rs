//! Canonical error types for the crate.
//!
//! [`Failure`] is the reason attached to a failed verdict. Every problem a
//! scenario can hit while decoding or comparing a response is folded into one
//! of its variants and reported through the verdict, never as a panic.
//! [`DecodeError`] describes envelope decoding problems reported by a client's
//! decoder, and [`ConfigError`] rejects unusable harness settings.

use thiserror::Error;

use crate::{client::Operation, verdict::Verdict};

/// Errors raised while decoding a response envelope.
///
/// The variants carry rendered text rather than source errors so that
/// failures stay `Clone` and comparable once they are attached to a verdict.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The envelope is not valid JSON or does not have the expected shape.
    #[error("{0}")]
    Json(String),
    /// The envelope is well formed but lacks the named field.
    #[error("envelope has no {0} field")]
    MissingField(&'static str),
    /// A contained message could not be decrypted.
    #[error("decryption failed: {0}")]
    Cipher(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(error: serde_json::Error) -> Self { Self::Json(error.to_string()) }
}

/// Reason a scenario failed.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The response could not be decoded or decrypted.
    #[error("Message: {0}")]
    Decode(#[from] DecodeError),
    /// A decoded value was present but did not match.
    #[error("Returned message mismatch: expected {expected:?}, received {actual:?}")]
    ContentMismatch {
        /// Text the scenario expected.
        expected: String,
        /// Text the service returned.
        actual: String,
    },
    /// A history fetch returned the wrong number of entries.
    #[error("expected {expected} messages, received {actual}")]
    CountMismatch {
        /// Number of entries the scenario expected.
        expected: usize,
        /// Number of entries the service returned.
        actual: usize,
    },
    /// Both response channels closed before any usable payload arrived.
    #[error("{0} response channels closed without data")]
    EmptyStream(Operation),
    /// The service reported an error the scenario did not expect.
    #[error("service error: {0}")]
    ServiceError(String),
    /// Fewer publishes were acknowledged than the scenario sent.
    #[error("only {acknowledged} of {expected} publishes were acknowledged")]
    Unacknowledged {
        /// Number of publishes issued.
        expected: usize,
        /// Number of publishes the service acknowledged.
        acknowledged: usize,
    },
    /// The task producing the verdict exited without writing one.
    #[error("scenario task exited without a verdict")]
    Abandoned,
}

/// Errors returned when validating a [`HarnessConfig`](crate::HarnessConfig).
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The channel name was empty.
    #[error("channel name must not be empty")]
    EmptyChannel,
    /// A batch size was zero.
    #[error("invalid {name} batch size {size}; must be >= 1")]
    InvalidBatch {
        /// Which batch setting was rejected.
        name: &'static str,
        /// The rejected value.
        size: usize,
    },
}

/// A failed verdict, returned by [`Verdict::into_result`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct VerdictError(pub Verdict);
