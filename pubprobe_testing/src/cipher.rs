//! Reversible test cipher.
//!
//! Real clients encrypt message bodies with their own cipher; these helpers
//! stand in for it so encrypted scenarios can run in memory. Each message is
//! serialized to JSON, XOR-ed with the repeating key, and base64 encoded.

use base64::{Engine, engine::general_purpose::STANDARD};
use pubprobe::{CipherKey, DecodeError, DecodedEnvelope, envelope::split_history_envelope};
use serde_json::Value;

/// XOR-and-base64 cipher keyed by a [`CipherKey`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorCipher {
    key: Vec<u8>,
}

impl XorCipher {
    /// Create a cipher for `key`.
    #[must_use]
    pub fn new(key: &CipherKey) -> Self {
        Self {
            key: key.expose().as_bytes().to_vec(),
        }
    }

    fn apply(&self, bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }

    /// Encrypt a message body into its ciphertext string.
    #[must_use]
    pub fn encrypt(&self, message: &Value) -> String {
        STANDARD.encode(self.apply(message.to_string().as_bytes()))
    }

    /// Decrypt a ciphertext string back into the message body.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Cipher`] if the text is not valid ciphertext
    /// for this key.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Value, DecodeError> {
        let bytes = STANDARD
            .decode(ciphertext)
            .map_err(|e| DecodeError::Cipher(e.to_string()))?;
        serde_json::from_slice(&self.apply(&bytes)).map_err(|e| DecodeError::Cipher(e.to_string()))
    }
}

/// Decode a history envelope, decrypting each message when `key` is given.
///
/// Both test clients use this as their
/// [`EnvelopeDecoder`](pubprobe::EnvelopeDecoder) implementation.
///
/// # Errors
///
/// Returns [`DecodeError`] for malformed envelopes and undecryptable
/// messages.
pub fn decode_envelope(
    raw: &[u8],
    key: Option<&CipherKey>,
) -> Result<DecodedEnvelope, DecodeError> {
    let (messages, start, end) = split_history_envelope(raw)?;
    let messages = match key.map(XorCipher::new) {
        None => messages,
        Some(cipher) => messages
            .iter()
            .map(|message| match message {
                Value::String(ciphertext) => cipher.decrypt(ciphertext),
                other => Err(DecodeError::Cipher(format!("{other} is not ciphertext"))),
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    DecodedEnvelope::from_messages(&messages, &start, &end)
}
