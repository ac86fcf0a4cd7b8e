//! The three-stage pipeline: adapt, scan, report. Runs once per invocation
//! and keeps nothing afterwards.

use crate::consts::MAX_PAYLOAD_LEN;
use crate::error::FilterError;
use crate::input::{InputEnvelope, Payload};
use crate::outcome::Outcome;
use crate::reporter::{LogSink, report};
use crate::scanner::scan_signature;

/// Run the filter over instruction data the host already extracted.
pub fn invoke<S>(data: &[u8], sink: &mut S) -> Outcome
where
    S: LogSink + ?Sized,
{
    invoke_with_limit(data, MAX_PAYLOAD_LEN, sink)
}

/// [`invoke`] with an explicit payload ceiling.
pub fn invoke_with_limit<S>(data: &[u8], limit: usize, sink: &mut S) -> Outcome
where
    S: LogSink + ?Sized,
{
    Payload::with_limit(data, limit)
        .and_then(|payload| run(payload, sink))
        .into()
}

/// Run the filter over a serialized program input region.
pub fn invoke_region<S>(region: &[u8], limit: usize, sink: &mut S) -> Outcome
where
    S: LogSink + ?Sized,
{
    InputEnvelope::parse_with_limit(region, limit)
        .and_then(|envelope| run(envelope.payload, sink))
        .into()
}

fn run<S>(payload: Payload<'_>, sink: &mut S) -> Result<Outcome, FilterError>
where
    S: LogSink + ?Sized,
{
    let result = scan_signature(payload.as_bytes());
    let status = report(sink, &result)?;
    let outcome = Outcome::settle(&result);
    debug_assert_eq!(outcome.exit_status(), Some(status));
    Ok(outcome)
}
