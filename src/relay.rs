//! Error-payload evaluation.
//!
//! Without an expected status, any error payload fails the scenario and is
//! surfaced verbatim. Negative scenarios configure the status text the
//! service must reject the request with; only an exact match passes.

use crate::{
    envelope::{RawResponse, status_text},
    error::Failure,
};

/// Turn an error-channel payload into a scenario outcome.
///
/// # Errors
///
/// Returns [`Failure::ServiceError`] when no rejection was expected,
/// [`Failure::Decode`] when the error envelope cannot be read, and
/// [`Failure::ContentMismatch`] when the status differs from `expected`.
pub fn relay_error(raw: &RawResponse, expected: Option<&str>) -> Result<(), Failure> {
    let Some(expected) = expected else {
        return Err(Failure::ServiceError(raw.text().into_owned()));
    };
    let status = status_text(raw)?;
    if status == expected {
        Ok(())
    } else {
        Err(Failure::ContentMismatch {
            expected: expected.to_owned(),
            actual: status,
        })
    }
}
