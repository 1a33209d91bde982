//! Scripted client for exercising delivery edge cases.
//!
//! [`ScriptedClient`] answers each request with the next queued [`Script`]
//! regardless of the request's content, and records every request it
//! receives. An exhausted queue answers by closing both channels at once.

use std::{collections::VecDeque, sync::Mutex, time::Duration};

use pubprobe::{
    CipherKey,
    DecodeError,
    DecodedEnvelope,
    EnvelopeDecoder,
    HistoryQuery,
    PubSubClient,
    RawResponse,
    Request,
    ResponseChannels,
    response_pair,
};
use serde_json::Value;

use crate::cipher::decode_envelope;

/// One event emitted on a response pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Send a payload on the success channel.
    Success(RawResponse),
    /// Send a payload on the error channel.
    Failure(RawResponse),
    /// Send the empty-array sentinel on the success channel.
    KeepAlive,
    /// Send the empty-array sentinel on the error channel.
    ErrorKeepAlive,
    /// Wait before the next step.
    Delay(Duration),
}

impl Step {
    /// Success payload from text.
    #[must_use]
    pub fn success(payload: impl Into<String>) -> Self {
        Self::Success(RawResponse::from(payload.into()))
    }

    /// Error payload from text.
    #[must_use]
    pub fn failure(payload: impl Into<String>) -> Self {
        Self::Failure(RawResponse::from(payload.into()))
    }
}

/// The steps answering one request. Both channels close after the last step.
pub type Script = Vec<Step>;

/// Client replaying queued scripts.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedClient {
    /// Create a client with no queued scripts.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a client answering successive requests with `scripts`.
    #[must_use]
    pub fn with_scripts(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            requests: Mutex::default(),
        }
    }

    /// Queue a script for a later request.
    ///
    /// # Panics
    ///
    /// Panics if the script queue lock is poisoned.
    pub fn push(&self, script: Script) {
        self.scripts
            .lock()
            .expect("script queue poisoned")
            .push_back(script);
    }

    /// Requests received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the request log lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .clone()
    }

    fn play(&self, request: Request) -> ResponseChannels {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request);
        let script = self
            .scripts
            .lock()
            .expect("script queue poisoned")
            .pop_front()
            .unwrap_or_default();
        let (sender, channels) = response_pair();
        tokio::spawn(async move {
            for step in script {
                let sent = match step {
                    Step::Success(raw) => sender.succeed(raw).await,
                    Step::Failure(raw) => sender.fail(raw).await,
                    Step::KeepAlive => sender.keep_alive().await,
                    Step::ErrorKeepAlive => sender.fail(RawResponse::empty_sentinel()).await,
                    Step::Delay(duration) => {
                        tokio::time::sleep(duration).await;
                        Ok(())
                    }
                };
                if sent.is_err() {
                    break;
                }
            }
        });
        channels
    }
}

impl EnvelopeDecoder for ScriptedClient {
    fn decode_envelope(
        &self,
        raw: &[u8],
        cipher_key: Option<&CipherKey>,
    ) -> Result<DecodedEnvelope, DecodeError> {
        decode_envelope(raw, cipher_key)
    }
}

impl PubSubClient for ScriptedClient {
    fn publish(&self, channel: &str, message: Value) -> ResponseChannels {
        self.play(Request::publish(channel, message))
    }

    fn history(&self, query: &HistoryQuery) -> ResponseChannels {
        self.play(Request::History(query.clone()))
    }

    fn time(&self) -> ResponseChannels { self.play(Request::Time) }
}
