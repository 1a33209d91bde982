//! Cipher key handling.
//!
//! The harness never encrypts or decrypts anything itself; it only carries
//! the key to the client's decoder. An empty key string means "no
//! encryption", matching how clients are usually configured.

use std::fmt;

/// A non-empty cipher key handed to the client's envelope decoder.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CipherKey(String);

impl CipherKey {
    /// Create a key, returning `None` for an empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use pubprobe::CipherKey;
    ///
    /// assert!(CipherKey::new("enigma").is_some());
    /// assert!(CipherKey::new("").is_none());
    /// ```
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        (!key.is_empty()).then_some(Self(key))
    }

    /// The key material.
    #[must_use]
    pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("CipherKey(..)") }
}
