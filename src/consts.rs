//! Project-wide constants.

/// The byte sequence every invocation searches for: `"YUREI"`.
pub const SIGNATURE: [u8; 5] = *b"YUREI";

/// The line emitted when the signature is present. Off-chain monitors match
/// on this exact text, so it must never change.
pub const PATTERN_FOUND_LOG: &str = "Pattern Found";

/// Prefix the host runtime puts in front of every line a program logs.
pub const PROGRAM_LOG_PREFIX: &str = "Program log: ";

/// Largest instruction payload the host can deliver. Top-level instructions
/// are bounded by the packet size well below this; instructions issued by
/// another program may carry up to 10 KiB.
pub const MAX_PAYLOAD_LEN: usize = 10 * 1024;

/// Default byte capacity of the host log collector.
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// Custom program error code for an intentional filter rejection.
pub const PATTERN_FOUND_CODE: u32 = 1;

/// Custom program error code for a refused log write.
pub const LOG_EXHAUSTED_CODE: u32 = 2;

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
