//! In-memory pub/sub service.
//!
//! [`MemoryClient`] implements [`PubSubClient`] against a process-local
//! message store. Each request is answered from a spawned task that emits the
//! configured number of keep-alive sentinels before the real payload, so the
//! harness sees the same delivery pattern a networked client produces.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use pubprobe::{
    CipherKey,
    DecodeError,
    DecodedEnvelope,
    EnvelopeDecoder,
    HistoryQuery,
    INVALID_MESSAGE_STATUS,
    MESSAGE_TOO_LARGE_STATUS,
    PUBLISH_SUCCESS_STATUS,
    PubSubClient,
    RawResponse,
    ResponseChannels,
    response_pair,
};
use serde_json::{Value, json};

use crate::cipher::{XorCipher, decode_envelope};

/// First timetoken handed out by a fresh client.
pub const INITIAL_TIMETOKEN: u64 = 17_000_000_000_000_000;

/// Largest serialized message body accepted by default.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1800;

/// A message held by the in-memory store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredMessage {
    /// Timetoken assigned when the message was published.
    pub timetoken: u64,
    /// Stored body, ciphertext when the client encrypts.
    pub body: Value,
}

/// Process-local stand-in for a pub/sub service and its client.
#[derive(Debug)]
pub struct MemoryClient {
    channels: DashMap<String, Vec<StoredMessage>>,
    clock: AtomicU64,
    cipher: Option<XorCipher>,
    max_message_bytes: usize,
    keep_alive: usize,
}

impl Default for MemoryClient {
    fn default() -> Self { Self::new() }
}

impl MemoryClient {
    /// Create an empty service with plain-text storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            clock: AtomicU64::new(INITIAL_TIMETOKEN),
            cipher: None,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            keep_alive: 0,
        }
    }

    /// Encrypt published messages with `key`. An empty key disables
    /// encryption.
    #[must_use]
    pub fn with_cipher_key(mut self, key: &str) -> Self {
        self.cipher = CipherKey::new(key).as_ref().map(XorCipher::new);
        self
    }

    /// Reject serialized message bodies longer than `limit` bytes.
    #[must_use]
    pub fn with_max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }

    /// Emit `count` sentinels before every payload.
    #[must_use]
    pub fn with_keep_alive(mut self, count: usize) -> Self {
        self.keep_alive = count;
        self
    }

    /// Messages stored on `channel`, oldest first.
    #[must_use]
    pub fn stored(&self, channel: &str) -> Vec<StoredMessage> {
        self.channels
            .get(channel)
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    fn tick(&self) -> u64 { self.clock.fetch_add(1, Ordering::SeqCst) + 1 }

    fn respond(&self, delivery: Result<String, String>) -> ResponseChannels {
        let (sender, channels) = response_pair();
        let keep_alive = self.keep_alive;
        tokio::spawn(async move {
            for _ in 0..keep_alive {
                if sender.keep_alive().await.is_err() {
                    return;
                }
            }
            // A closed receiver means the harness already settled elsewhere.
            let _ = match delivery {
                Ok(payload) => sender.succeed(RawResponse::from(payload)).await,
                Err(payload) => sender.fail(RawResponse::from(payload)).await,
            };
        });
        channels
    }

    fn store(&self, channel: &str, message: &Value) -> Result<u64, String> {
        let timetoken = self.tick();
        if message.is_null() {
            return Err(json!([0, INVALID_MESSAGE_STATUS, timetoken.to_string()]).to_string());
        }
        let body = match &self.cipher {
            Some(cipher) => Value::String(cipher.encrypt(message)),
            None => message.clone(),
        };
        if body.to_string().len() > self.max_message_bytes {
            return Err(json!([0, MESSAGE_TOO_LARGE_STATUS, timetoken.to_string()]).to_string());
        }
        self.channels
            .entry(channel.to_owned())
            .or_default()
            .push(StoredMessage { timetoken, body });
        Ok(timetoken)
    }

    fn envelope(&self, query: &HistoryQuery) -> String {
        let mut selected: Vec<StoredMessage> = self
            .stored(&query.channel)
            .into_iter()
            .filter(|m| query.start.is_none_or(|start| m.timetoken >= start))
            .filter(|m| query.end.is_none_or(|end| m.timetoken < end))
            .collect();
        if query.reverse {
            selected.truncate(query.limit);
        } else {
            let skip = selected.len().saturating_sub(query.limit);
            selected.drain(..skip);
        }
        let first = selected.first().map_or(0, |m| m.timetoken);
        let last = selected.last().map_or(0, |m| m.timetoken);
        let bodies: Vec<Value> = selected.into_iter().map(|m| m.body).collect();
        json!([bodies, first, last]).to_string()
    }
}

impl EnvelopeDecoder for MemoryClient {
    fn decode_envelope(
        &self,
        raw: &[u8],
        cipher_key: Option<&CipherKey>,
    ) -> Result<DecodedEnvelope, DecodeError> {
        decode_envelope(raw, cipher_key)
    }
}

impl PubSubClient for MemoryClient {
    fn publish(&self, channel: &str, message: Value) -> ResponseChannels {
        let delivery = self.store(channel, &message).map(|timetoken| {
            json!([1, PUBLISH_SUCCESS_STATUS, timetoken.to_string()]).to_string()
        });
        self.respond(delivery)
    }

    fn history(&self, query: &HistoryQuery) -> ResponseChannels {
        self.respond(Ok(self.envelope(query)))
    }

    fn time(&self) -> ResponseChannels {
        let now = self.tick();
        self.respond(Ok(json!([now]).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pubprobe::Delivery;
    use rstest::rstest;

    use super::*;

    #[tokio::test]
    async fn publish_is_stored_before_acknowledgement() {
        let client = MemoryClient::new();
        let channels = client.publish("testChannel", json!("hello"));

        assert_eq!(client.stored("testChannel").len(), 1);
        let Some(Delivery::Success(ack)) = channels.settle().await else {
            panic!("expected acknowledgement");
        };
        assert!(ack.text().contains(PUBLISH_SUCCESS_STATUS));
    }

    #[rstest]
    #[case(false, vec!["m2", "m3"])]
    #[case(true, vec!["m0", "m1"])]
    #[tokio::test]
    async fn history_limit_honours_direction(#[case] reverse: bool, #[case] expected: Vec<&str>) {
        let client = MemoryClient::new();
        for i in 0..4 {
            drop(client.publish("c", json!(format!("m{i}"))));
        }
        let query = HistoryQuery::new("c", 2).reverse(reverse);
        let Some(Delivery::Success(raw)) = client.history(&query).settle().await else {
            panic!("expected history");
        };
        let envelope = client
            .decode_envelope(raw.as_bytes(), None)
            .expect("plain envelope");
        assert_eq!(envelope.messages(), Ok(expected.iter().map(|&m| m.to_owned()).collect()));
    }

    #[tokio::test]
    async fn null_message_is_rejected_without_storing() {
        let client = MemoryClient::new();
        let Some(Delivery::Failure(raw)) = client.publish("c", Value::Null).settle().await else {
            panic!("expected rejection");
        };
        assert!(raw.text().contains(INVALID_MESSAGE_STATUS));
        assert!(client.stored("c").is_empty());
    }

    #[tokio::test]
    async fn keep_alives_precede_payload() {
        let client = MemoryClient::new().with_keep_alive(3);
        assert!(matches!(client.time().settle().await, Some(Delivery::Success(_))));
    }
}
