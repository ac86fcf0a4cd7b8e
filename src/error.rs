//! Conditions that abort an invocation before it can report an outcome.

use thiserror::Error;

/// Why an invocation was aborted.
///
/// A filter rejection is not an error: it is carried by
/// [`Outcome::RejectedByFilter`](crate::Outcome::RejectedByFilter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The host could not furnish a usable payload.
    #[error("malformed input: {reason}")]
    MalformedInput { reason: &'static str },

    /// The log stream refused a line.
    #[error("log exhausted: {needed} bytes needed, {remaining} remaining")]
    LogExhausted { needed: usize, remaining: usize },
}

impl FilterError {
    pub fn malformed(reason: &'static str) -> Self {
        Self::MalformedInput { reason }
    }
}
