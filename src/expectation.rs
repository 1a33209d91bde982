//! What a scenario expects to receive.

use crate::error::Failure;

/// Expected outcome of a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// The raw success payload must contain this status text.
    ///
    /// Used for publish acknowledgements, which are never encrypted.
    Acknowledged(String),
    /// Some decoded message must contain this text.
    Contains(String),
    /// The decoded success payload must be exactly this ordered batch.
    Sequence(SequenceSpec),
    /// The service must reject the request with exactly this status text on
    /// the error channel.
    Rejected(String),
    /// The success payload must be a time envelope holding a positive
    /// timetoken.
    PositiveTimestamp,
}

impl Expectation {
    /// Expect a decoded payload containing `text`.
    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self { Self::Contains(text.into()) }

    /// Expect a rejection with status `status`.
    #[must_use]
    pub fn rejected(status: impl Into<String>) -> Self { Self::Rejected(status.into()) }

    /// Expect an acknowledgement carrying `status`.
    #[must_use]
    pub fn acknowledged(status: impl Into<String>) -> Self { Self::Acknowledged(status.into()) }

    /// Status text the error channel should carry, for negative scenarios.
    #[must_use]
    pub fn expected_error(&self) -> Option<&str> {
        match self {
            Self::Rejected(status) => Some(status),
            _ => None,
        }
    }
}

/// An ordered batch of messages `prefix + (start + i)` for `i` in
/// `0..count`.
///
/// # Examples
///
/// ```
/// use pubprobe::SequenceSpec;
///
/// let spec = SequenceSpec::new("Test Message ", 5, 2);
/// assert_eq!(spec.expected().collect::<Vec<_>>(), ["Test Message 5", "Test Message 6"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceSpec {
    /// Text shared by every message.
    pub prefix: String,
    /// Index appended to the first message.
    pub start: usize,
    /// Number of messages in the batch.
    pub count: usize,
}

impl SequenceSpec {
    /// Describe a batch of `count` messages numbered from `start`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, start: usize, count: usize) -> Self {
        Self {
            prefix: prefix.into(),
            start,
            count,
        }
    }

    /// The expected messages, in order.
    pub fn expected(&self) -> impl Iterator<Item = String> + '_ {
        (self.start..self.start + self.count).map(|index| format!("{}{index}", self.prefix))
    }

    /// Check `received` against the batch position by position.
    ///
    /// # Errors
    ///
    /// Returns [`Failure::CountMismatch`] if the lengths differ, otherwise
    /// [`Failure::ContentMismatch`] for the first differing entry.
    pub fn check(&self, received: &[String]) -> Result<(), Failure> {
        if received.len() != self.count {
            return Err(Failure::CountMismatch {
                expected: self.count,
                actual: received.len(),
            });
        }
        match received
            .iter()
            .zip(self.expected())
            .find(|(actual, expected)| *actual != expected)
        {
            Some((actual, expected)) => Err(Failure::ContentMismatch {
                expected,
                actual: actual.clone(),
            }),
            None => Ok(()),
        }
    }
}
