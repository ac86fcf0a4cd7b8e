use super::LogSink;
use crate::consts::{DEFAULT_LOG_CAPACITY, PROGRAM_LOG_PREFIX};
use crate::error::FilterError;

/// An in-memory log stream with a byte budget, standing in for the host
/// log collector in local runs and tests.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    messages: Vec<String>,
    capacity: usize,
    used: usize,
}

impl RecordingSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::new(),
            capacity,
            used: 0,
        }
    }

    /// Lines exactly as the program logged them.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Lines framed the way the host prints them (`Program log: ...`).
    pub fn host_lines(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| format!("{PROGRAM_LOG_PREFIX}{m}"))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl LogSink for RecordingSink {
    fn log(&mut self, line: &str) -> Result<(), FilterError> {
        if line.len() > self.remaining() {
            return Err(FilterError::LogExhausted {
                needed: line.len(),
                remaining: self.remaining(),
            });
        }
        self.used += line.len();
        self.messages.push(line.to_string());
        Ok(())
    }
}
