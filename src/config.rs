//! Harness configuration.
//!
//! [`HarnessConfig`] names the channel scenarios run against, the cipher key
//! handed to the client's decoder, batch sizes for history scenarios, and the
//! pacing intervals used by the default [`IntervalPacer`](crate::IntervalPacer).

use std::time::Duration;

use crate::{cipher::CipherKey, error::ConfigError, tracing_config::TracingConfig};

/// Default channel scenarios publish on.
pub const DEFAULT_CHANNEL: &str = "testChannel";
/// Default prefix of batch messages; the batch index is appended.
pub const DEFAULT_MESSAGE_PREFIX: &str = "Test Message ";
/// Default number of messages in a detailed history batch.
pub const DEFAULT_HISTORY_BATCH: usize = 10;
/// Default number of messages in each time window.
pub const DEFAULT_WINDOW_BATCH: usize = 5;
/// Default gap between consecutive publishes of a batch.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(500);
/// Default gap between scenarios of a suite.
pub const DEFAULT_SCENARIO_COOLDOWN: Duration = Duration::from_secs(2);

/// Settings shared by every scenario a [`Harness`](crate::Harness) runs.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use pubprobe::HarnessConfig;
///
/// let config = HarnessConfig::default()
///     .with_cipher_key("enigma")
///     .with_publish_interval(Duration::ZERO);
/// assert_eq!(config.cipher_key().map(|k| k.expose()), Some("enigma"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub(crate) channel: String,
    pub(crate) cipher_key: Option<CipherKey>,
    pub(crate) message_prefix: String,
    pub(crate) history_batch: usize,
    pub(crate) window_batch: usize,
    pub(crate) publish_interval: Duration,
    pub(crate) scenario_cooldown: Duration,
    pub(crate) tracing: TracingConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_owned(),
            cipher_key: None,
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_owned(),
            history_batch: DEFAULT_HISTORY_BATCH,
            window_batch: DEFAULT_WINDOW_BATCH,
            publish_interval: DEFAULT_PUBLISH_INTERVAL,
            scenario_cooldown: DEFAULT_SCENARIO_COOLDOWN,
            tracing: TracingConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Set the channel scenarios publish on and read from.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the cipher key passed to the client's decoder. An empty string
    /// disables decryption.
    #[must_use]
    pub fn with_cipher_key(mut self, key: impl Into<String>) -> Self {
        self.cipher_key = CipherKey::new(key);
        self
    }

    /// Set the prefix of batch messages.
    #[must_use]
    pub fn with_message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// Set how many messages the detailed history scenario publishes and
    /// fetches.
    #[must_use]
    pub fn with_history_batch(mut self, size: usize) -> Self {
        self.history_batch = size;
        self
    }

    /// Set how many messages each time window holds.
    #[must_use]
    pub fn with_window_batch(mut self, size: usize) -> Self {
        self.window_batch = size;
        self
    }

    /// Set the gap between consecutive publishes of a batch.
    #[must_use]
    pub fn with_publish_interval(mut self, interval: Duration) -> Self {
        self.publish_interval = interval;
        self
    }

    /// Set the gap between scenarios of a suite.
    #[must_use]
    pub fn with_scenario_cooldown(mut self, cooldown: Duration) -> Self {
        self.scenario_cooldown = cooldown;
        self
    }

    /// Set span levels and timing.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Channel scenarios run against.
    #[must_use]
    pub fn channel(&self) -> &str { &self.channel }

    /// Cipher key handed to the decoder, if any.
    #[must_use]
    pub fn cipher_key(&self) -> Option<&CipherKey> { self.cipher_key.as_ref() }

    /// Prefix of batch messages.
    #[must_use]
    pub fn message_prefix(&self) -> &str { &self.message_prefix }

    /// Detailed history batch size.
    #[must_use]
    pub fn history_batch(&self) -> usize { self.history_batch }

    /// Messages per time window.
    #[must_use]
    pub fn window_batch(&self) -> usize { self.window_batch }

    /// Gap between consecutive publishes of a batch.
    #[must_use]
    pub fn publish_interval(&self) -> Duration { self.publish_interval }

    /// Gap between scenarios of a suite.
    #[must_use]
    pub fn scenario_cooldown(&self) -> Duration { self.scenario_cooldown }

    /// Span levels and timing.
    #[must_use]
    pub fn tracing(&self) -> &TracingConfig { &self.tracing }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyChannel`] for an empty channel name and
    /// [`ConfigError::InvalidBatch`] for a zero batch size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.is_empty() {
            return Err(ConfigError::EmptyChannel);
        }
        for (name, size) in [("history", self.history_batch), ("window", self.window_batch)] {
            if size == 0 {
                return Err(ConfigError::InvalidBatch { name, size });
            }
        }
        Ok(())
    }
}
