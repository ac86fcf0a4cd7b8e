//! Turns a scan result into the log line and exit status the host sees.

pub mod recording;

use crate::consts::PATTERN_FOUND_LOG;
use crate::error::FilterError;
use crate::outcome::ExitStatus;
use crate::scanner::MatchResult;

/// Where program log lines go. On chain this is the runtime log
/// collector; off chain it is a [`recording::RecordingSink`].
pub trait LogSink {
    /// Append one line. An error aborts the invocation.
    fn log(&mut self, line: &str) -> Result<(), FilterError>;
}

/// Commit the outcome of a scan.
///
/// Both the log line and the status derive from `result.found()`, so a
/// `"Pattern Found"` line is written if and only if the returned status is
/// [`ExitStatus::PatternFound`]. Nothing is logged when the signature is
/// absent.
pub fn report<S>(sink: &mut S, result: &MatchResult) -> Result<ExitStatus, FilterError>
where
    S: LogSink + ?Sized,
{
    let status = ExitStatus::from(result);
    if status == ExitStatus::PatternFound {
        sink.log(PATTERN_FOUND_LOG)?;
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::recording::RecordingSink;
    use super::*;

    #[test]
    fn found_logs_once_and_returns_one() {
        let mut sink = RecordingSink::default();
        let status = report(&mut sink, &MatchResult::at(2)).unwrap();
        assert_eq!(status, ExitStatus::PatternFound);
        assert_eq!(sink.messages(), ["Pattern Found"]);
    }

    #[test]
    fn absent_logs_nothing_and_returns_zero() {
        let mut sink = RecordingSink::default();
        let status = report(&mut sink, &MatchResult::absent()).unwrap();
        assert_eq!(status, ExitStatus::PatternAbsent);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn refused_line_aborts() {
        let mut sink = RecordingSink::with_capacity(4);
        let err = report(&mut sink, &MatchResult::at(0)).unwrap_err();
        assert!(matches!(err, FilterError::LogExhausted { .. }));
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn absent_never_touches_a_full_sink() {
        let mut sink = RecordingSink::with_capacity(0);
        assert_eq!(
            report(&mut sink, &MatchResult::absent()),
            Ok(ExitStatus::PatternAbsent)
        );
    }
}
