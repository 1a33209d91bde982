//! Server time retrieval.

use super::Harness;
use crate::{
    channels::Delivery,
    client::{Operation, PubSubClient, Request},
    envelope::decode_timestamp,
    error::Failure,
    expectation::Expectation,
    verdict::Verdict,
};

impl<C> Harness<C>
where
    C: PubSubClient + ?Sized + 'static,
{
    /// Fetch the current server timetoken.
    ///
    /// # Errors
    ///
    /// Returns [`Failure::EmptyStream`] if the response carries no value,
    /// [`Failure::Decode`] if it is not an integer array, and
    /// [`Failure::ServiceError`] if the service answers on the error channel.
    pub async fn server_time(&self) -> Result<u64, Failure> {
        match self.exchange(&Request::Time).await {
            None => Err(Failure::EmptyStream(Operation::Time)),
            Some(Delivery::Success(raw)) => decode_timestamp(&raw),
            Some(Delivery::Failure(raw)) => Err(Failure::ServiceError(raw.text().into_owned())),
        }
    }

    /// Check that the service reports a positive timetoken.
    pub async fn server_time_check(&self, name: &str) -> Verdict {
        self.run_scenario(name, |harness| async move {
            harness
                .request(&Request::Time, &Expectation::PositiveTimestamp)
                .await
        })
        .await
    }
}
