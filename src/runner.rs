//! Local replay of the on-chain pipeline.
//!
//! The runner feeds a payload through [`filter`](crate::filter) against a
//! [`RecordingSink`] and reports what the host would have seen: the exit
//! status and the program's own log lines. It does not estimate compute
//! units; those belong to the runtime.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::RunnerConfig;
use crate::filter;
use crate::outcome::Outcome;
use crate::reporter::recording::RecordingSink;

/// Process exit code used when the invocation aborts instead of returning.
pub const ABORT_EXIT_CODE: i32 = 2;

/// What one local invocation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcome: &'static str,
    /// `0` or `1`; absent when the invocation aborted.
    pub exit_status: Option<u64>,
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub payload_len: usize,
    pub payload_sha256: String,
    pub logs: Vec<String>,
}

impl RunReport {
    /// Exit code for the CLI process: the status itself, or
    /// [`ABORT_EXIT_CODE`] for an abort.
    pub fn process_exit_code(&self) -> i32 {
        match self.exit_status {
            Some(code) => code as i32,
            None => ABORT_EXIT_CODE,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.logs {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("outcome   {}\n", self.outcome));
        match self.exit_status {
            Some(code) => out.push_str(&format!("status    {code}\n")),
            None => out.push_str("status    aborted\n"),
        }
        if let Some(offset) = self.offset {
            out.push_str(&format!("offset    {offset}\n"));
        }
        if let Some(error) = &self.error {
            out.push_str(&format!("error     {error}\n"));
        }
        out.push_str(&format!("length    {}\n", self.payload_len));
        out.push_str(&format!("sha256    {}\n", self.payload_sha256));
        out
    }
}

pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Replay an invocation over already-extracted instruction data.
    pub fn run(&self, payload: &[u8]) -> RunReport {
        let mut sink = RecordingSink::with_capacity(self.config.log_capacity);
        let outcome = filter::invoke_with_limit(payload, self.config.max_payload_len, &mut sink);
        self.finish(payload, outcome, &sink)
    }

    /// Replay an invocation over a serialized program input region.
    pub fn run_region(&self, region: &[u8]) -> RunReport {
        let mut sink = RecordingSink::with_capacity(self.config.log_capacity);
        let outcome = filter::invoke_region(region, self.config.max_payload_len, &mut sink);
        self.finish(region, outcome, &sink)
    }

    fn finish(&self, input: &[u8], outcome: Outcome, sink: &RecordingSink) -> RunReport {
        let report = RunReport {
            outcome: outcome.label(),
            exit_status: outcome.exit_status().map(|status| status.code()),
            offset: match &outcome {
                Outcome::RejectedByFilter { offset } => Some(*offset),
                _ => None,
            },
            error: match &outcome {
                Outcome::Aborted(err) => Some(err.to_string()),
                _ => None,
            },
            payload_len: input.len(),
            payload_sha256: hex::encode(Sha256::digest(input)),
            logs: sink.host_lines(),
        };
        match &outcome {
            Outcome::Aborted(err) => tracing::warn!(%err, len = input.len(), "invocation aborted"),
            _ => tracing::info!(
                outcome = report.outcome,
                offset = ?report.offset,
                len = input.len(),
                "invocation finished"
            ),
        }
        report
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}
