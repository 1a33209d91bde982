//! Publish scenarios.

use serde_json::Value;

use super::Harness;
use crate::{
    client::{PubSubClient, Request},
    envelope::{INVALID_MESSAGE_STATUS, MESSAGE_TOO_LARGE_STATUS, PUBLISH_SUCCESS_STATUS},
    expectation::Expectation,
    verdict::Verdict,
};

impl<C> Harness<C>
where
    C: PubSubClient + ?Sized + 'static,
{
    /// Publish `message` and expect the service to acknowledge it with
    /// [`PUBLISH_SUCCESS_STATUS`].
    ///
    /// `message` may be any JSON structure; use `serde_json::to_value` for
    /// typed payloads.
    pub async fn publish_acknowledged(&self, name: &str, message: Value) -> Verdict {
        let request = Request::publish(self.config.channel(), message);
        self.run_scenario(name, move |harness| async move {
            harness
                .request(&request, &Expectation::acknowledged(PUBLISH_SUCCESS_STATUS))
                .await
        })
        .await
    }

    /// Publish `message` and expect the service to reject it with `status`.
    pub async fn publish_rejected(&self, name: &str, message: Value, status: &str) -> Verdict {
        let request = Request::publish(self.config.channel(), message);
        let expectation = Expectation::rejected(status);
        self.run_scenario(name, move |harness| async move {
            harness.request(&request, &expectation).await
        })
        .await
    }

    /// Publish a `null` message; the service must answer
    /// [`INVALID_MESSAGE_STATUS`].
    pub async fn null_message_rejected(&self, name: &str) -> Verdict {
        self.publish_rejected(name, Value::Null, INVALID_MESSAGE_STATUS)
            .await
    }

    /// Publish `message`, which must exceed the service's size limit; the
    /// service must answer [`MESSAGE_TOO_LARGE_STATUS`].
    pub async fn oversized_message_rejected(
        &self,
        name: &str,
        message: impl Into<String>,
    ) -> Verdict {
        self.publish_rejected(name, Value::String(message.into()), MESSAGE_TOO_LARGE_STATUS)
            .await
    }
}
