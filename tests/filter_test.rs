use rand::RngExt;

use yurei_filter::consts::{PATTERN_FOUND_LOG, SIGNATURE};
use yurei_filter::filter::invoke;
use yurei_filter::reporter::recording::RecordingSink;
use yurei_filter::{ExitStatus, Outcome, scan_signature};

/// Run one invocation and return the outcome plus what it logged.
fn invoke_logged(data: &[u8]) -> (Outcome, Vec<String>) {
    let mut sink = RecordingSink::default();
    let outcome = invoke(data, &mut sink);
    (outcome, sink.messages().to_vec())
}

fn logged_found(logs: &[String]) -> bool {
    logs.iter().any(|line| line.contains(PATTERN_FOUND_LOG))
}

// ── Scenarios ─────────────────────────────────────────────────────

#[test]
fn signature_in_the_middle_is_rejected() {
    let (outcome, logs) = invoke_logged(&[0x01, 0x02, 0x59, 0x55, 0x52, 0x45, 0x49, 0x03, 0x04]);
    assert_eq!(outcome, Outcome::RejectedByFilter { offset: 2 });
    assert_eq!(outcome.exit_status(), Some(ExitStatus::PatternFound));
    assert!(logged_found(&logs));
}

#[test]
fn corrupted_signature_is_accepted() {
    let (outcome, logs) = invoke_logged(&[0x01, 0x02, 0x59, 0x55, 0x00, 0x45, 0x49, 0x03, 0x04]);
    assert_eq!(outcome, Outcome::Accepted);
    assert_eq!(outcome.exit_status(), Some(ExitStatus::PatternAbsent));
    assert!(!logged_found(&logs));
}

#[test]
fn empty_payload_is_accepted() {
    let (outcome, logs) = invoke_logged(&[]);
    assert_eq!(outcome.exit_status().map(ExitStatus::code), Some(0));
    assert!(logs.is_empty());
}

#[test]
fn bare_signature_is_rejected_at_zero() {
    let (outcome, logs) = invoke_logged(&SIGNATURE);
    assert_eq!(outcome, Outcome::RejectedByFilter { offset: 0 });
    assert_eq!(outcome.exit_status().map(ExitStatus::code), Some(1));
    assert_eq!(logs, ["Pattern Found"]);
}

// ── Boundaries ────────────────────────────────────────────────────

#[test]
fn every_short_length_is_accepted() {
    for len in 0..SIGNATURE.len() {
        let (outcome, _) = invoke_logged(&SIGNATURE[..len]);
        assert_eq!(outcome, Outcome::Accepted, "len {len}");
    }
}

#[test]
fn signature_ending_at_last_byte_is_rejected() {
    let mut data = vec![0xAA; 64];
    data.extend_from_slice(&SIGNATURE);
    let (outcome, _) = invoke_logged(&data);
    assert_eq!(outcome, Outcome::RejectedByFilter { offset: 64 });
}

#[test]
fn signature_split_by_one_byte_is_accepted() {
    let (outcome, _) = invoke_logged(b"YUR\x00EI");
    assert_eq!(outcome, Outcome::Accepted);
}

// ── Contract ──────────────────────────────────────────────────────

#[test]
fn status_and_log_always_agree() {
    const ALPHABET: &[u8] = b"YUREI.";
    let mut rng = rand::rng();
    for _ in 0..1_000 {
        let len: usize = rng.random_range(0..32);
        let data: Vec<u8> = (0..len)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
            .collect();

        let (outcome, logs) = invoke_logged(&data);
        let found = scan_signature(&data).found();
        let status = outcome.exit_status().unwrap();

        assert_eq!(found, status == ExitStatus::PatternFound, "input {data:?}");
        assert_eq!(found, logged_found(&logs), "input {data:?}");
        assert!(logs.len() <= 1);
    }
}

#[test]
fn repeated_invocations_are_identical() {
    let data = b"..YUREI..";
    let first = invoke_logged(data);
    for _ in 0..10 {
        assert_eq!(invoke_logged(data), first);
    }
}
