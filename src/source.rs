//! Where a locally replayed payload comes from.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A payload given on the command line, in a file, or on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Hex digits, optionally `0x`-prefixed, whitespace ignored.
    Hex(String),
    /// Standard base64, the encoding RPC nodes use for instruction data.
    Base64(String),
    /// Raw bytes from a file.
    File(PathBuf),
    /// Raw bytes from standard input.
    Stdin,
}

impl PayloadSource {
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            PayloadSource::Hex(text) => decode_hex(text),
            PayloadSource::Base64(text) => STANDARD
                .decode(text.trim())
                .context("payload is not valid base64"),
            PayloadSource::File(path) => std::fs::read(path)
                .with_context(|| format!("failed to read payload from {}", path.display())),
            PayloadSource::Stdin => {
                let mut bytes = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut bytes)
                    .context("failed to read payload from stdin")?;
                Ok(bytes)
            }
        }
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    hex::decode(digits).context("payload is not valid hex")
}
