//! Fixed-pattern substring search with length-only cost.
//!
//! The scan visits every window and compares every byte of it, folding the
//! differences instead of stopping at the first mismatch. The number of
//! operations therefore depends on the buffer length alone, which keeps
//! compute consumption predictable and says nothing about where (or
//! whether) the signature sits.

use crate::consts::SIGNATURE;

/// Where the pattern was first seen, if at all. Presence is derived from
/// the offset, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    offset: Option<usize>,
}

impl MatchResult {
    pub const fn absent() -> Self {
        Self { offset: None }
    }

    pub const fn at(offset: usize) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    pub fn found(&self) -> bool {
        self.offset.is_some()
    }

    /// Lowest offset of a match. Later matches are not reported.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

/// Search `bytes` for an exact, case-sensitive occurrence of `pattern`.
///
/// Returns the lowest matching offset. Buffers shorter than the pattern
/// are rejected before any indexing takes place.
pub fn scan<const M: usize>(bytes: &[u8], pattern: &[u8; M]) -> MatchResult {
    const { assert!(M > 0, "pattern must not be empty") };

    if bytes.len() < M {
        return MatchResult::absent();
    }

    let mut first = usize::MAX;
    // Walk from the tail so the last write is the lowest offset.
    for (offset, window) in bytes.windows(M).enumerate().rev() {
        let diff = window
            .iter()
            .zip(pattern)
            .fold(0u8, |acc, (byte, expected)| acc | (byte ^ expected));
        first = select(diff == 0, offset, first);
    }

    if first == usize::MAX {
        MatchResult::absent()
    } else {
        MatchResult::at(first)
    }
}

/// [`scan`] for the fixed [`SIGNATURE`].
pub fn scan_signature(bytes: &[u8]) -> MatchResult {
    scan(bytes, &SIGNATURE)
}

/// `if cond { a } else { b }` without a data-dependent branch.
#[inline(always)]
fn select(cond: bool, a: usize, b: usize) -> usize {
    let mask = (cond as usize).wrapping_neg();
    (a & mask) | (b & !mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_PAYLOAD_LEN;
    use rand::RngExt;

    fn reference(bytes: &[u8]) -> Option<usize> {
        bytes.windows(SIGNATURE.len()).position(|w| w == SIGNATURE.as_slice())
    }

    #[test]
    fn scenario_signature_in_the_middle() {
        let data = [0x01, 0x02, 0x59, 0x55, 0x52, 0x45, 0x49, 0x03, 0x04];
        let result = scan_signature(&data);
        assert!(result.found());
        assert_eq!(result.offset(), Some(2));
    }

    #[test]
    fn scenario_one_byte_corrupted() {
        let data = [0x01, 0x02, 0x59, 0x55, 0x00, 0x45, 0x49, 0x03, 0x04];
        assert_eq!(scan_signature(&data), MatchResult::absent());
    }

    #[test]
    fn scenario_empty_input() {
        assert_eq!(scan_signature(&[]), MatchResult::absent());
    }

    #[test]
    fn scenario_exact_signature() {
        assert_eq!(scan_signature(b"YUREI"), MatchResult::at(0));
    }

    #[test]
    fn shorter_than_signature_never_matches() {
        for len in 0..SIGNATURE.len() {
            let prefix = &SIGNATURE[..len];
            assert!(!scan_signature(prefix).found(), "prefix of len {len}");
        }
    }

    #[test]
    fn match_ending_at_last_byte() {
        let data = b"\x00\x00\x00YUREI";
        assert_eq!(scan_signature(data), MatchResult::at(3));
    }

    #[test]
    fn reports_first_of_several_matches() {
        let data = b"..YUREI..YUREI";
        assert_eq!(scan_signature(data).offset(), Some(2));
    }

    #[test]
    fn overlapping_prefix_does_not_hide_match() {
        assert_eq!(scan_signature(b"YUYUREI").offset(), Some(2));
        assert_eq!(scan_signature(b"YYUREI").offset(), Some(1));
    }

    #[test]
    fn case_sensitive() {
        assert!(!scan_signature(b"yurei").found());
        assert!(!scan_signature(b"Yurei").found());
    }

    #[test]
    fn partial_signature_at_tail_is_not_a_match() {
        assert!(!scan_signature(b"abcdYURE").found());
    }

    #[test]
    fn generic_pattern_lengths() {
        assert_eq!(scan(b"abc", b"c"), MatchResult::at(2));
        assert_eq!(scan(b"abc", b"abc"), MatchResult::at(0));
        assert_eq!(scan(b"abc", b"abcd"), MatchResult::absent());
    }

    #[test]
    fn repeated_scans_agree() {
        let data = b"xxYUREIxx";
        assert_eq!(scan_signature(data), scan_signature(data));
    }

    #[test]
    fn found_and_offset_agree() {
        assert!(MatchResult::absent().offset().is_none());
        assert!(!MatchResult::default().found());
        assert_eq!(MatchResult::at(7).offset(), Some(7));
    }

    #[test]
    fn select_picks_by_condition() {
        assert_eq!(select(true, 3, 9), 3);
        assert_eq!(select(false, 3, 9), 9);
        assert_eq!(select(true, usize::MAX, 0), usize::MAX);
    }

    #[test]
    fn agrees_with_reference_on_random_buffers() {
        // A narrow alphabet makes partial and full matches common.
        const ALPHABET: &[u8] = b"YUREIX";
        let mut rng = rand::rng();
        for _ in 0..2_000 {
            let len: usize = rng.random_range(0..48);
            let data: Vec<u8> = (0..len)
                .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
                .collect();
            let result = scan_signature(&data);
            assert_eq!(result.offset(), reference(&data), "input {data:?}");
            assert_eq!(result.found(), result.offset().is_some());
        }
    }

    #[test]
    fn detects_signature_planted_anywhere() {
        let mut rng = rand::rng();
        for _ in 0..500 {
            let len = rng.random_range(SIGNATURE.len()..MAX_PAYLOAD_LEN);
            let mut data: Vec<u8> = (0..len).map(|_| rng.random::<u8>() & 0x3f).collect();
            let at = rng.random_range(0..=len - SIGNATURE.len());
            data[at..at + SIGNATURE.len()].copy_from_slice(&SIGNATURE);
            assert_eq!(scan_signature(&data).offset(), reference(&data));
            assert!(scan_signature(&data).offset().is_some_and(|o| o <= at));
        }
    }
}
