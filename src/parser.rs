//! Success-payload evaluation.
//!
//! The parser stage takes the payload a response pair settled on and turns
//! it into a pass or a [`Failure`], decoding through the client when the
//! expectation calls for it.

use crate::{
    cipher::CipherKey,
    client::EnvelopeDecoder,
    envelope::{DecodedPayload, RawResponse, decode_timestamp},
    error::Failure,
    expectation::Expectation,
};

/// Decode `raw` into the payload shape `expectation` compares against.
///
/// Acknowledgements are compared as raw text; history payloads go through the
/// client's decoder, which decrypts them when `cipher_key` is set. Time
/// envelopes decode to their timetoken.
///
/// # Errors
///
/// Returns [`Failure::Decode`] if the client cannot decode the envelope and
/// [`Failure::EmptyStream`] for a time envelope without a value.
pub fn decode<D>(
    decoder: &D,
    raw: &RawResponse,
    cipher_key: Option<&CipherKey>,
    expectation: &Expectation,
) -> Result<DecodedPayload, Failure>
where
    D: EnvelopeDecoder + ?Sized,
{
    match expectation {
        Expectation::Acknowledged(_) | Expectation::Rejected(_) => {
            Ok(DecodedPayload::Message(raw.text().into_owned()))
        }
        Expectation::Contains(_) => {
            let envelope = decoder.decode_envelope(raw.as_bytes(), cipher_key)?;
            Ok(DecodedPayload::Messages(envelope.message_texts()?))
        }
        Expectation::Sequence(_) => {
            let envelope = decoder.decode_envelope(raw.as_bytes(), cipher_key)?;
            Ok(DecodedPayload::Messages(envelope.messages()?))
        }
        Expectation::PositiveTimestamp => decode_timestamp(raw).map(DecodedPayload::Timestamp),
    }
}

/// Evaluate a success payload against `expectation`.
///
/// A [`Expectation::Contains`] check passes when any decoded message contains
/// the expected text.
///
/// # Errors
///
/// Returns the [`Failure`] describing why the payload does not satisfy the
/// expectation. A success payload for an [`Expectation::Rejected`] scenario
/// is a [`Failure::ContentMismatch`].
pub fn evaluate<D>(
    decoder: &D,
    raw: &RawResponse,
    cipher_key: Option<&CipherKey>,
    expectation: &Expectation,
) -> Result<(), Failure>
where
    D: EnvelopeDecoder + ?Sized,
{
    let payload = decode(decoder, raw, cipher_key, expectation)?;
    match (expectation, payload) {
        (Expectation::Acknowledged(expected), DecodedPayload::Message(text)) => {
            if text.contains(expected.as_str()) {
                Ok(())
            } else {
                Err(mismatch(expected, text))
            }
        }
        (Expectation::Contains(expected), DecodedPayload::Messages(messages)) => {
            if messages.iter().any(|m| m.contains(expected.as_str())) {
                Ok(())
            } else {
                Err(mismatch(expected, format!("{messages:?}")))
            }
        }
        (Expectation::Sequence(spec), DecodedPayload::Messages(messages)) => spec.check(&messages),
        (Expectation::Rejected(expected), DecodedPayload::Message(text)) => {
            Err(mismatch(expected, text))
        }
        (Expectation::PositiveTimestamp, DecodedPayload::Timestamp(token)) => {
            tracing::debug!(timetoken = token, "server time");
            if token > 0 {
                Ok(())
            } else {
                Err(mismatch("positive timetoken", token.to_string()))
            }
        }
        (_, payload) => Err(mismatch(format!("{expectation:?}"), format!("{payload:?}"))),
    }
}

fn mismatch(expected: impl Into<String>, actual: String) -> Failure {
    Failure::ContentMismatch {
        expected: expected.into(),
        actual,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::{
        envelope::{DecodedEnvelope, split_history_envelope},
        error::DecodeError,
        expectation::SequenceSpec,
    };

    /// Decoder that reverses each message when given a key.
    struct ReversingDecoder;

    impl EnvelopeDecoder for ReversingDecoder {
        fn decode_envelope(
            &self,
            raw: &[u8],
            cipher_key: Option<&CipherKey>,
        ) -> Result<DecodedEnvelope, DecodeError> {
            let (messages, start, end) = split_history_envelope(raw)?;
            let messages: Vec<Value> = match cipher_key {
                None => messages,
                Some(_) => messages
                    .into_iter()
                    .map(|m| match m {
                        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
                        _ => Err(DecodeError::Cipher("not ciphertext".to_owned())),
                    })
                    .collect::<Result<_, _>>()?,
            };
            DecodedEnvelope::from_messages(&messages, &start, &end)
        }
    }

    fn key() -> CipherKey { CipherKey::new("enigma").expect("non-empty key") }

    #[test]
    fn acknowledgement_matches_raw_status() {
        let raw = RawResponse::from(r#"[1,"Sent","17"]"#);
        assert_eq!(
            evaluate(&ReversingDecoder, &raw, None, &Expectation::acknowledged("Sent")),
            Ok(())
        );
    }

    #[test]
    fn contains_checks_substring_of_decoded_payload() {
        let raw = RawResponse::from(r#"[["Test Message"],1,2]"#);
        assert_eq!(
            evaluate(&ReversingDecoder, &raw, None, &Expectation::contains("Test Message")),
            Ok(())
        );
    }

    #[test]
    fn contains_decrypts_before_comparing() {
        let raw = RawResponse::from(r#"[["egasseM tseT"],1,2]"#);
        let expectation = Expectation::contains("Test Message");
        assert_eq!(evaluate(&ReversingDecoder, &raw, Some(&key()), &expectation), Ok(()));
        assert!(matches!(
            evaluate(&ReversingDecoder, &raw, None, &expectation),
            Err(Failure::ContentMismatch { .. })
        ));
    }

    #[rstest]
    #[case(r#"He said \"hi\""#, r#"He said "hi""#)]
    #[case(r#"C:\\path"#, r"C:\path")]
    #[case(r#"line one\nline two"#, "line one\nline two")]
    #[case(r#"caf\u00e9 \u2603"#, "café ☃")]
    fn contains_compares_unescaped_messages(#[case] encoded: &str, #[case] message: &str) {
        let raw = RawResponse::from(format!(r#"[["{encoded}"],1,2]"#));
        assert_eq!(
            evaluate(&ReversingDecoder, &raw, None, &Expectation::contains(message)),
            Ok(())
        );
    }

    #[test]
    fn contains_matches_any_message_of_the_list() {
        let raw = RawResponse::from(r#"[["older",{"text":"Test Message"}],1,2]"#);
        assert_eq!(
            evaluate(&ReversingDecoder, &raw, None, &Expectation::contains("Test Message")),
            Ok(())
        );
    }

    #[rstest]
    #[case("[17000000000000000]", Ok(()))]
    #[case(
        "[0]",
        Err(Failure::ContentMismatch {
            expected: "positive timetoken".to_owned(),
            actual: "0".to_owned(),
        })
    )]
    fn timestamp_must_be_positive(
        #[case] payload: &'static str,
        #[case] expected: Result<(), Failure>,
    ) {
        let raw = RawResponse::from(payload);
        assert_eq!(
            evaluate(&ReversingDecoder, &raw, None, &Expectation::PositiveTimestamp),
            expected
        );
    }

    #[test]
    fn sequence_compares_decrypted_entries() {
        let raw = RawResponse::from(r#"[["0 egasseM tseT","1 egasseM tseT"],1,2]"#);
        let expectation = Expectation::Sequence(SequenceSpec::new("Test Message ", 0, 2));
        assert_eq!(evaluate(&ReversingDecoder, &raw, Some(&key()), &expectation), Ok(()));
    }

    #[test]
    fn undecodable_payload_reports_decode_failure() {
        let raw = RawResponse::from("{not json");
        let err = evaluate(&ReversingDecoder, &raw, None, &Expectation::contains("x"))
            .expect_err("must fail");
        assert!(matches!(err, Failure::Decode(DecodeError::Json(_))));
        assert!(err.to_string().starts_with("Message: "));
    }

    #[test]
    fn non_string_history_entries_fail_sequence_decoding() {
        let raw = RawResponse::from(r#"[[{"foo":"hi!"}],1,2]"#);
        let expectation = Expectation::Sequence(SequenceSpec::new("Test Message ", 0, 1));
        assert!(matches!(
            evaluate(&ReversingDecoder, &raw, None, &expectation),
            Err(Failure::Decode(_))
        ));
    }

    #[test]
    fn success_for_rejection_scenario_is_mismatch() {
        let raw = RawResponse::from(r#"[1,"Sent","17"]"#);
        assert_eq!(
            evaluate(&ReversingDecoder, &raw, None, &Expectation::rejected("Message Too Large")),
            Err(Failure::ContentMismatch {
                expected: "Message Too Large".to_owned(),
                actual: r#"[1,"Sent","17"]"#.to_owned(),
            })
        );
    }
}
