//! Raw responses and the envelope shapes the harness understands.
//!
//! A client delivers opaque [`RawResponse`] payloads on its success and error
//! channels. The literal two-byte token `[]` ([`EMPTY_SENTINEL`]) means "no
//! data yet" and is filtered out before anything here tries to decode it.
//!
//! The helpers in this module cover the envelopes the harness inspects
//! directly: publish acknowledgements and service errors (`[code, "status",
//! ...]`), time responses (`[timetoken]`), and history envelopes
//! (`[[messages...], start, end]`). Decrypting history messages is the
//! client's job; see [`EnvelopeDecoder`](crate::client::EnvelopeDecoder).

use std::borrow::Cow;

use bytes::Bytes;
use serde_json::Value;

use crate::{
    client::Operation,
    error::{DecodeError, Failure},
};

/// The empty-array token a client emits while it has nothing to report.
pub const EMPTY_SENTINEL: &[u8] = b"[]";

/// Status text the service returns for an accepted publish.
pub const PUBLISH_SUCCESS_STATUS: &str = "Sent";

/// Status text the service returns for a null publish payload.
pub const INVALID_MESSAGE_STATUS: &str = "Invalid Message";

/// Status text the service returns for an oversized publish payload.
pub const MESSAGE_TOO_LARGE_STATUS: &str = "Message Too Large";

/// Opaque payload delivered on a response channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse(Bytes);

impl RawResponse {
    /// Wrap raw bytes received from a client.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self { Self(bytes.into()) }

    /// The payload meaning "no data yet".
    #[must_use]
    pub fn empty_sentinel() -> Self { Self(Bytes::from_static(EMPTY_SENTINEL)) }

    /// Returns `true` if this payload is exactly the empty-array sentinel.
    ///
    /// The comparison is byte-exact: `[ ]` or a history envelope holding an
    /// empty message list are ordinary payloads.
    #[must_use]
    pub fn is_empty_sentinel(&self) -> bool { self.0.as_ref() == EMPTY_SENTINEL }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.0 }

    /// The payload as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> { String::from_utf8_lossy(&self.0) }

    /// Number of payload bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Returns `true` if the payload has no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<&'static str> for RawResponse {
    fn from(value: &'static str) -> Self { Self(Bytes::from_static(value.as_bytes())) }
}

impl From<String> for RawResponse {
    fn from(value: String) -> Self { Self(Bytes::from(value)) }
}

impl From<Vec<u8>> for RawResponse {
    fn from(value: Vec<u8>) -> Self { Self(Bytes::from(value)) }
}

impl From<Bytes> for RawResponse {
    fn from(value: Bytes) -> Self { Self(value) }
}

/// A history envelope after the client has decoded (and possibly decrypted)
/// it.
///
/// `payload` is the JSON text of the message list; `start_token` and
/// `end_token` are the bounding timetokens reported by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEnvelope {
    /// JSON text of the decoded message list.
    pub payload: String,
    /// Timetoken of the oldest message in the envelope.
    pub start_token: String,
    /// Timetoken of the newest message in the envelope.
    pub end_token: String,
}

impl DecodedEnvelope {
    /// Build an envelope from already-decoded messages and their bounds.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Json`] if the messages cannot be serialized.
    pub fn from_messages(
        messages: &[Value],
        start_token: &Value,
        end_token: &Value,
    ) -> Result<Self, DecodeError> {
        Ok(Self {
            payload: serde_json::to_string(messages)?,
            start_token: start_token.to_string(),
            end_token: end_token.to_string(),
        })
    }

    /// Parse the payload as an ordered list of string messages.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Json`] if any message is not a string.
    pub fn messages(&self) -> Result<Vec<String>, DecodeError> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    /// The decoded messages as plain text.
    ///
    /// String messages are returned unescaped; structured messages are
    /// rendered as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Json`] if the payload is not a JSON list.
    pub fn message_texts(&self) -> Result<Vec<String>, DecodeError> {
        let messages: Vec<Value> = serde_json::from_str(&self.payload)?;
        Ok(messages
            .into_iter()
            .map(|message| match message {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect())
    }
}

/// A value extracted from a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedPayload {
    /// Free-form decoded text, compared by containment.
    Message(String),
    /// Ordered history entries, compared position by position.
    Messages(Vec<String>),
    /// A server timetoken.
    Timestamp(u64),
}

/// Split a history envelope into its messages and bounding timetokens.
///
/// Client decoders use this before decrypting the individual messages.
///
/// # Errors
///
/// Returns [`DecodeError`] if the envelope is not a JSON array whose first
/// element is the message list.
pub fn split_history_envelope(raw: &[u8]) -> Result<(Vec<Value>, Value, Value), DecodeError> {
    let parts: Vec<Value> = serde_json::from_slice(raw)?;
    let mut parts = parts.into_iter();
    let Some(Value::Array(messages)) = parts.next() else {
        return Err(DecodeError::MissingField("message list"));
    };
    let start = parts.next().unwrap_or(Value::from(0));
    let end = parts.next().unwrap_or(Value::from(0));
    Ok((messages, start, end))
}

/// Extract the status text (second element) of an acknowledgement or error
/// envelope.
///
/// # Errors
///
/// Returns [`DecodeError`] if the payload is not a JSON array or its second
/// element is missing or not a string.
pub fn status_text(raw: &RawResponse) -> Result<String, DecodeError> {
    let parts: Vec<Value> = serde_json::from_slice(raw.as_bytes())?;
    match parts.get(1) {
        Some(Value::String(status)) => Ok(status.clone()),
        _ => Err(DecodeError::MissingField("status")),
    }
}

/// Decode a time response into its timetoken.
///
/// # Errors
///
/// Returns [`Failure::EmptyStream`] for a blank or empty array payload and
/// [`Failure::Decode`] when the payload is not an array of integers.
pub fn decode_timestamp(raw: &RawResponse) -> Result<u64, Failure> {
    if raw.is_empty() {
        return Err(Failure::EmptyStream(Operation::Time));
    }
    let tokens: Vec<u64> = serde_json::from_slice(raw.as_bytes()).map_err(DecodeError::from)?;
    tokens
        .first()
        .copied()
        .ok_or(Failure::EmptyStream(Operation::Time))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(b"[]".as_slice(), true)]
    #[case(b"[ ]".as_slice(), false)]
    #[case(b"[[],0,0]".as_slice(), false)]
    #[case(b"".as_slice(), false)]
    fn sentinel_comparison_is_byte_exact(#[case] bytes: &[u8], #[case] expected: bool) {
        let raw = RawResponse::new(bytes.to_vec());
        assert_eq!(raw.is_empty_sentinel(), expected);
    }

    #[rstest]
    #[case(r#"[1,"Sent","14"]"#, Ok("Sent".to_owned()))]
    #[case(r#"[0,"Message Too Large","14"]"#, Ok("Message Too Large".to_owned()))]
    #[case(r"[0]", Err(DecodeError::MissingField("status")))]
    #[case(r"[0, 7]", Err(DecodeError::MissingField("status")))]
    fn status_text_reads_second_element(
        #[case] payload: &'static str,
        #[case] expected: Result<String, DecodeError>,
    ) {
        assert_eq!(status_text(&RawResponse::from(payload)), expected);
    }

    #[test]
    fn status_text_rejects_non_json() {
        let err = status_text(&RawResponse::from("not json")).expect_err("must fail");
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn timestamp_decodes_single_element() {
        let raw = RawResponse::from("[17000000000000000]");
        assert_eq!(decode_timestamp(&raw), Ok(17_000_000_000_000_000));
    }

    #[rstest]
    #[case("", Failure::EmptyStream(Operation::Time))]
    #[case("[ ]", Failure::EmptyStream(Operation::Time))]
    fn timestamp_without_value_is_empty(#[case] payload: &'static str, #[case] expected: Failure) {
        assert_eq!(decode_timestamp(&RawResponse::from(payload)), Err(expected));
    }

    #[test]
    fn malformed_timestamp_is_decode_failure() {
        let err = decode_timestamp(&RawResponse::from(r#"["soon"]"#)).expect_err("must fail");
        assert!(matches!(err, Failure::Decode(DecodeError::Json(_))));
    }

    #[test]
    fn history_envelope_splits_messages_and_bounds() {
        let (messages, start, end) =
            split_history_envelope(br#"[["a","b"],11,12]"#).expect("valid envelope");
        assert_eq!(messages, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(start, Value::from(11));
        assert_eq!(end, Value::from(12));
    }

    #[test]
    fn history_envelope_requires_message_list() {
        let err = split_history_envelope(br#"[1,"Sent","14"]"#).expect_err("must fail");
        assert_eq!(err, DecodeError::MissingField("message list"));
    }

    #[test]
    fn message_texts_are_unescaped() {
        let messages = [json!("He said \"hi\""), json!("C:\\path"), json!({"foo": 1})];
        let envelope = DecodedEnvelope::from_messages(&messages, &json!(1), &json!(2))
            .expect("serialize messages");
        assert_eq!(
            envelope.message_texts(),
            Ok(vec![
                r#"He said "hi""#.to_owned(),
                r"C:\path".to_owned(),
                r#"{"foo":1}"#.to_owned(),
            ])
        );
    }

    #[test]
    fn decoded_envelope_round_trips_string_messages() {
        let envelope = DecodedEnvelope::from_messages(
            &[Value::from("Test Message 0"), Value::from("Test Message 1")],
            &Value::from(1),
            &Value::from(2),
        )
        .expect("serialize messages");
        assert_eq!(
            envelope.messages().expect("string messages"),
            vec!["Test Message 0".to_owned(), "Test Message 1".to_owned()]
        );
        assert_eq!(envelope.start_token, "1");
    }
}
