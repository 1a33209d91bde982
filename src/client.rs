//! The client capability the harness drives.
//!
//! The harness does not talk to the network. It issues requests through a
//! [`PubSubClient`], which answers each request with a fresh
//! [`ResponseChannels`] pair, and asks the same client to decode (and decrypt)
//! history envelopes through [`EnvelopeDecoder`].

use std::fmt;

use serde_json::Value;

use crate::{
    channels::ResponseChannels,
    cipher::CipherKey,
    envelope::DecodedEnvelope,
    error::DecodeError,
};

/// Kind of request issued to the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Publish a message on a channel.
    Publish,
    /// Fetch stored messages from a channel.
    History,
    /// Fetch the current server timetoken.
    Time,
}

impl Operation {
    /// Stable lowercase name used in logs and metric labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Publish => "publish",
            Operation::History => "history",
            Operation::Time => "time",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Parameters of a history fetch.
///
/// # Examples
///
/// ```
/// use pubprobe::client::HistoryQuery;
///
/// let query = HistoryQuery::new("testChannel", 5).between(100, 200);
/// assert_eq!(query.start, Some(100));
/// assert_eq!(query.end, Some(200));
/// assert!(!query.reverse);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Channel to read from.
    pub channel: String,
    /// Maximum number of messages to return.
    pub limit: usize,
    /// Inclusive lower timetoken bound.
    pub start: Option<u64>,
    /// Exclusive upper timetoken bound.
    pub end: Option<u64>,
    /// Return the oldest messages first instead of the newest.
    pub reverse: bool,
}

impl HistoryQuery {
    /// Fetch the newest `limit` messages of `channel`.
    #[must_use]
    pub fn new(channel: impl Into<String>, limit: usize) -> Self {
        Self {
            channel: channel.into(),
            limit,
            start: None,
            end: None,
            reverse: false,
        }
    }

    /// Restrict the fetch to timetokens in `[start, end)`.
    #[must_use]
    pub fn between(mut self, start: u64, end: u64) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Return the oldest messages in the range first.
    #[must_use]
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

/// A request issued to the service. Requests are never mutated once issued.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// Publish `message` on `channel`. `message` may be `null` or any JSON
    /// structure.
    Publish {
        /// Target channel.
        channel: String,
        /// Message body.
        message: Value,
    },
    /// Fetch stored messages.
    History(HistoryQuery),
    /// Fetch the server timetoken.
    Time,
}

impl Request {
    /// Build a publish request.
    #[must_use]
    pub fn publish(channel: impl Into<String>, message: impl Into<Value>) -> Self {
        Self::Publish {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// The operation this request performs.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Publish { .. } => Operation::Publish,
            Self::History(_) => Operation::History,
            Self::Time => Operation::Time,
        }
    }

    /// The channel this request targets, if any.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::Publish { channel, .. } => Some(channel),
            Self::History(query) => Some(&query.channel),
            Self::Time => None,
        }
    }
}

/// Decodes history envelopes, decrypting messages when a key is supplied.
pub trait EnvelopeDecoder {
    /// Decode `raw`, decrypting each contained message with `cipher_key` if
    /// one is given.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the envelope is malformed or a message
    /// cannot be decrypted.
    fn decode_envelope(
        &self,
        raw: &[u8],
        cipher_key: Option<&CipherKey>,
    ) -> Result<DecodedEnvelope, DecodeError>;
}

/// Asynchronous pub/sub client under test.
///
/// Each call returns immediately with the receiving half of a fresh response
/// pair. The client answers on one of the two channels and then closes both;
/// it may emit the empty-array sentinel any number of times before the real
/// payload.
pub trait PubSubClient: EnvelopeDecoder + Send + Sync {
    /// Publish `message` on `channel`.
    fn publish(&self, channel: &str, message: Value) -> ResponseChannels;

    /// Fetch stored messages.
    fn history(&self, query: &HistoryQuery) -> ResponseChannels;

    /// Fetch the current server timetoken.
    fn time(&self) -> ResponseChannels;

    /// Issue any [`Request`].
    fn dispatch(&self, request: &Request) -> ResponseChannels {
        match request {
            Request::Publish { channel, message } => self.publish(channel, message.clone()),
            Request::History(query) => self.history(query),
            Request::Time => self.time(),
        }
    }
}
