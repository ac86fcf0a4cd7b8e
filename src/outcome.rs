//! How an invocation ended, and the number the host is handed for it.

use crate::error::FilterError;
use crate::scanner::MatchResult;

/// The numeric result returned to the host. Non-zero fails the enclosing
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitStatus {
    PatternAbsent = 0,
    PatternFound = 1,
}

impl ExitStatus {
    pub fn code(self) -> u64 {
        self as u64
    }
}

impl From<&MatchResult> for ExitStatus {
    fn from(result: &MatchResult) -> Self {
        if result.found() {
            ExitStatus::PatternFound
        } else {
            ExitStatus::PatternAbsent
        }
    }
}

/// Tagged result of one pass through the pipeline. The numeric convention
/// is applied only where the host boundary needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Signature absent; the transaction may proceed.
    Accepted,
    /// Signature present at `offset`; the transaction must fail.
    RejectedByFilter { offset: usize },
    /// The invocation could not complete.
    Aborted(FilterError),
}

impl Outcome {
    /// The outcome of a scan the reporter has already committed. Its
    /// status is [`ExitStatus::from`] the same result.
    pub fn settle(result: &MatchResult) -> Self {
        match result.offset() {
            Some(offset) => Outcome::RejectedByFilter { offset },
            None => Outcome::Accepted,
        }
    }

    /// The status handed to the host, or `None` when the invocation aborts
    /// instead of returning.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Outcome::Accepted => Some(ExitStatus::PatternAbsent),
            Outcome::RejectedByFilter { .. } => Some(ExitStatus::PatternFound),
            Outcome::Aborted(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::RejectedByFilter { .. } => "rejected-by-filter",
            Outcome::Aborted(FilterError::MalformedInput { .. }) => "malformed-input",
            Outcome::Aborted(FilterError::LogExhausted { .. }) => "log-exhausted",
        }
    }
}

impl From<Result<Outcome, FilterError>> for Outcome {
    fn from(result: Result<Outcome, FilterError>) -> Self {
        result.unwrap_or_else(Outcome::Aborted)
    }
}
