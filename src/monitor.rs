//! Off-chain interpretation of captured transaction logs.
//!
//! A failed transaction alone does not say whether the filter rejected the
//! payload or the invocation broke. [`classify`] reads the host log stream
//! (the RPC `logMessages` array), follows the runtime's invoke/return
//! framing to find the filter's own frame, and names what happened without
//! re-running the scan.

use anyhow::Context;
use serde::Serialize;

use crate::consts::{PATTERN_FOUND_CODE, PATTERN_FOUND_LOG, PROGRAM_LOG_PREFIX, format_number};

const INVALID_DATA_REASON: &str = "invalid instruction data";
const BUDGET_EXCEEDED_REASONS: &[&str] = &["exceeded CUs meter", "Computational budget exceeded"];
const TRUNCATED_LINE: &str = "Log truncated";

/// Compute units reported by the host for the filter's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComputeUsage {
    pub consumed: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "kebab-case")]
pub enum Verdict {
    /// Returned 0 without logging the signature line.
    Accepted,
    /// Returned 1 after logging `"Pattern Found"`.
    RejectedByFilter,
    /// Rejected the instruction data as unusable.
    MalformedInput,
    /// The host stopped the invocation at the compute ceiling.
    ResourceExhausted,
    /// The log collector dropped lines before the outcome was visible.
    LogTruncated,
    /// Log text and status disagree.
    ContractViolation { reason: String },
    /// Failed for a reason unrelated to the filter contract.
    Failed { reason: String },
    /// The frame started but no terminal line was captured.
    Incomplete,
    /// No matching invocation in the log.
    NotInvoked,
}

impl Verdict {
    /// The exit status this verdict implies, when it implies one.
    pub fn exit_status(&self) -> Option<u64> {
        match self {
            Verdict::Accepted => Some(0),
            Verdict::RejectedByFilter => Some(1),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub program_id: Option<String>,
    pub compute: Option<ComputeUsage>,
}

impl Classification {
    pub fn render(&self) -> String {
        let mut out = match &self.verdict {
            Verdict::Accepted => "verdict   accepted\n".to_string(),
            Verdict::RejectedByFilter => "verdict   rejected-by-filter\n".to_string(),
            Verdict::MalformedInput => "verdict   malformed-input\n".to_string(),
            Verdict::ResourceExhausted => "verdict   resource-exhausted\n".to_string(),
            Verdict::LogTruncated => "verdict   log-truncated\n".to_string(),
            Verdict::ContractViolation { reason } => {
                format!("verdict   contract-violation ({reason})\n")
            }
            Verdict::Failed { reason } => format!("verdict   failed ({reason})\n"),
            Verdict::Incomplete => "verdict   incomplete\n".to_string(),
            Verdict::NotInvoked => "verdict   not-invoked\n".to_string(),
        };
        if let Some(id) = &self.program_id {
            out.push_str(&format!("program   {id}\n"));
        }
        if let Some(usage) = self.compute {
            out.push_str(&format!(
                "compute   {} of {} units\n",
                format_number(usage.consumed),
                format_number(usage.budget)
            ));
        }
        out
    }
}

/// One host log line, as far as the filter contract cares.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogEvent<'a> {
    Invoke { program: &'a str },
    Log(&'a str),
    Consumed { program: &'a str, usage: ComputeUsage },
    Success { program: &'a str },
    Failed { program: &'a str, reason: &'a str },
    Truncated,
    Other,
}

fn parse_line(line: &str) -> LogEvent<'_> {
    if let Some(message) = line.strip_prefix(PROGRAM_LOG_PREFIX) {
        return LogEvent::Log(message);
    }
    if line == TRUNCATED_LINE {
        return LogEvent::Truncated;
    }
    let Some(rest) = line.strip_prefix("Program ") else {
        return LogEvent::Other;
    };
    let Some((program, tail)) = rest.split_once(' ') else {
        return LogEvent::Other;
    };

    if tail.starts_with("invoke [") {
        LogEvent::Invoke { program }
    } else if tail == "success" {
        LogEvent::Success { program }
    } else if let Some(reason) = tail.strip_prefix("failed: ") {
        LogEvent::Failed { program, reason }
    } else if let Some(usage) = parse_consumed(tail) {
        LogEvent::Consumed { program, usage }
    } else {
        LogEvent::Other
    }
}

/// `consumed <n> of <m> compute units`
fn parse_consumed(tail: &str) -> Option<ComputeUsage> {
    let rest = tail.strip_prefix("consumed ")?;
    let rest = rest.strip_suffix(" compute units")?;
    let (consumed, budget) = rest.split_once(" of ")?;
    Some(ComputeUsage {
        consumed: consumed.parse().ok()?,
        budget: budget.parse().ok()?,
    })
}

enum Terminal<'a> {
    Success,
    Failed(&'a str),
}

/// Pull log lines out of a captured JSON document.
///
/// Accepts a bare array of strings, a simulation or send error carrying
/// `logs`, or a `getTransaction` response (`meta.logMessages`, optionally
/// wrapped in the JSON-RPC `result`).
pub fn parse_log_document(text: &str) -> anyhow::Result<Vec<String>> {
    let document: serde_json::Value =
        serde_json::from_str(text).context("log document is not JSON")?;
    let document = document.get("result").unwrap_or(&document);
    let lines = document
        .as_array()
        .or_else(|| document.get("logs").and_then(|v| v.as_array()))
        .or_else(|| {
            document
                .get("meta")
                .and_then(|meta| meta.get("logMessages"))
                .and_then(|v| v.as_array())
        })
        .context("no log lines found in document")?;
    lines
        .iter()
        .map(|line| {
            line.as_str()
                .map(str::to_string)
                .context("log line is not a string")
        })
        .collect()
}

/// Classify the filter's invocation in a captured log.
///
/// With `program_id` the first frame of that program is used. Without it,
/// the first frame that logged `"Pattern Found"` or failed, else the first
/// top-level frame.
pub fn classify<S: AsRef<str>>(lines: &[S], program_id: Option<&str>) -> Classification {
    match program_id {
        Some(id) => classify_frame(lines, program_id, |_, program| program == id),
        None => {
            let start = suspect_frame(lines);
            classify_frame(lines, None, |index, _| Some(index) == start)
        }
    }
}

/// Line index of the invoke most likely to be the filter's. A failure
/// propagates outwards, so the first failed line belongs to the innermost
/// failing frame.
fn suspect_frame<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    let mut open: Vec<usize> = Vec::new();
    let mut first = None;
    let mut top_level = 0usize;

    for (index, line) in lines.iter().enumerate() {
        match parse_line(line.as_ref()) {
            LogEvent::Invoke { .. } => {
                if open.is_empty() {
                    top_level += 1;
                    first = first.or(Some(index));
                }
                open.push(index);
            }
            LogEvent::Log(message) if message.contains(PATTERN_FOUND_LOG) => {
                if let Some(&frame) = open.last() {
                    return Some(frame);
                }
            }
            LogEvent::Failed { .. } => {
                if let Some(&frame) = open.last() {
                    return Some(frame);
                }
            }
            LogEvent::Success { .. } => {
                open.pop();
            }
            _ => {}
        }
    }

    if top_level > 1 {
        tracing::warn!(
            frames = top_level,
            "no program id and no frame rejected or failed; using the first top-level frame"
        );
    }
    first
}

fn classify_frame<S, F>(lines: &[S], program_id: Option<&str>, wanted: F) -> Classification
where
    S: AsRef<str>,
    F: Fn(usize, &str) -> bool,
{
    let mut stack: Vec<&str> = Vec::new();
    let mut target: Option<(usize, &str)> = None;
    let mut found = false;
    let mut truncated = false;
    let mut compute = None;
    let mut terminal = None;

    for (index, line) in lines.iter().enumerate() {
        let event = parse_line(line.as_ref());
        let in_target = target.is_some_and(|(depth, _)| depth == stack.len());
        let current = target;
        let is_target =
            move |program: &str| in_target && current.is_some_and(|(_, id)| id == program);
        match event {
            LogEvent::Invoke { program } => {
                stack.push(program);
                if target.is_none() && wanted(index, program) {
                    target = Some((stack.len(), program));
                }
            }
            LogEvent::Log(message) if in_target => {
                found |= message.contains(PATTERN_FOUND_LOG);
            }
            LogEvent::Consumed { program, usage } if is_target(program) => compute = Some(usage),
            LogEvent::Success { program } if is_target(program) => {
                terminal = Some(Terminal::Success);
                break;
            }
            LogEvent::Failed { program, reason } if is_target(program) => {
                terminal = Some(Terminal::Failed(reason));
                break;
            }
            LogEvent::Success { program } | LogEvent::Failed { program, .. } => {
                if stack.pop() != Some(program) {
                    tracing::debug!(program, "unbalanced frame in log");
                }
            }
            LogEvent::Truncated => {
                if target.is_some() {
                    truncated = true;
                }
            }
            LogEvent::Log(_) | LogEvent::Consumed { .. } | LogEvent::Other => {}
        }
    }

    let Some((_, program)) = target else {
        return Classification {
            verdict: Verdict::NotInvoked,
            program_id: program_id.map(str::to_string),
            compute: None,
        };
    };

    let verdict = decide(terminal, found, truncated);
    tracing::debug!(program, ?verdict, "classified invocation");
    Classification {
        verdict,
        program_id: Some(program.to_string()),
        compute,
    }
}

fn decide(terminal: Option<Terminal<'_>>, found: bool, truncated: bool) -> Verdict {
    let rejection = format!("custom program error: 0x{PATTERN_FOUND_CODE:x}");
    match terminal {
        Some(Terminal::Success) if found => Verdict::ContractViolation {
            reason: "Pattern Found logged but the invocation succeeded".to_string(),
        },
        Some(Terminal::Success) => Verdict::Accepted,
        Some(Terminal::Failed(reason))
            if BUDGET_EXCEEDED_REASONS.iter().any(|r| reason.contains(r)) =>
        {
            Verdict::ResourceExhausted
        }
        Some(Terminal::Failed(reason)) if reason == rejection => {
            if found {
                Verdict::RejectedByFilter
            } else if truncated {
                Verdict::LogTruncated
            } else {
                Verdict::ContractViolation {
                    reason: "status 1 without a Pattern Found line".to_string(),
                }
            }
        }
        Some(Terminal::Failed(reason)) if found => Verdict::ContractViolation {
            reason: format!("Pattern Found logged but the invocation failed with: {reason}"),
        },
        Some(Terminal::Failed(INVALID_DATA_REASON)) => Verdict::MalformedInput,
        Some(Terminal::Failed(reason)) => Verdict::Failed {
            reason: reason.to_string(),
        },
        None if truncated => Verdict::LogTruncated,
        None => Verdict::Incomplete,
    }
}
