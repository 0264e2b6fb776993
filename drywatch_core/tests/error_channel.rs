//! Asymmetric hysteresis on the device error code.

use drywatch_core::config::ErrorCfg;
use drywatch_core::decode::VALUE_ERROR;
use drywatch_core::hysteresis::{ErrorChannel, ErrorEvent};
use drywatch_core::tables::{DIGIT_PATTERNS, LETTER_INDEX};

fn error_bytes(digit: usize) -> (u8, u8) {
    (DIGIT_PATTERNS[LETTER_INDEX], DIGIT_PATTERNS[digit])
}

fn channel() -> ErrorChannel {
    // Defaults: confirm after 3, clear after 10.
    ErrorChannel::new(ErrorCfg::default())
}

#[test]
fn confirms_on_third_matching_observation() {
    let mut ch = channel();
    let (high, low) = error_bytes(3);

    assert_eq!(ch.observe(VALUE_ERROR, high, low), None);
    assert_eq!(ch.observe(VALUE_ERROR, high, low), None);
    assert!(!ch.is_active());

    match ch.observe(VALUE_ERROR, high, low) {
        Some(ErrorEvent::Raised(code)) => assert_eq!(code.to_string(), "E3"),
        other => panic!("expected Raised, got {other:?}"),
    }
    assert!(ch.is_active());
}

#[test]
fn clears_only_on_tenth_normal_observation() {
    let mut ch = channel();
    let (high, low) = error_bytes(0);
    for _ in 0..3 {
        ch.observe(VALUE_ERROR, high, low);
    }
    assert!(ch.is_active());

    for i in 0..9 {
        assert_eq!(ch.observe(44, 0, 0), None, "normal reading {i}");
        assert!(ch.is_active());
    }
    assert_eq!(ch.observe(44, 0, 0), Some(ErrorEvent::Cleared));
    assert!(!ch.is_active());
}

#[test]
fn interleaved_error_reading_restarts_the_clear_count() {
    let mut ch = channel();
    let (high, low) = error_bytes(5);
    for _ in 0..3 {
        ch.observe(VALUE_ERROR, high, low);
    }

    // 9 normal readings, then the error shows up again: clearing starts over.
    for _ in 0..9 {
        ch.observe(44, 0, 0);
    }
    assert_eq!(ch.observe(VALUE_ERROR, high, low), None);
    for _ in 0..9 {
        assert_eq!(ch.observe(44, 0, 0), None);
    }
    assert!(ch.is_active());
    assert_eq!(ch.observe(44, 0, 0), Some(ErrorEvent::Cleared));
}

#[test]
fn changing_code_restarts_the_confirm_count() {
    let mut ch = channel();
    let (h0, l0) = error_bytes(0);
    let (h1, l1) = error_bytes(1);

    ch.observe(VALUE_ERROR, h0, l0);
    ch.observe(VALUE_ERROR, h0, l0);
    // Different code: candidate replaced, streak back to 1.
    assert_eq!(ch.observe(VALUE_ERROR, h1, l1), None);
    assert_eq!(ch.observe(VALUE_ERROR, h1, l1), None);
    match ch.observe(VALUE_ERROR, h1, l1) {
        Some(ErrorEvent::Raised(code)) => assert_eq!(code.digit(), 1),
        other => panic!("expected Raised(E1), got {other:?}"),
    }
}

#[test]
fn new_code_while_active_replaces_the_old_one() {
    let mut ch = channel();
    let (h2, l2) = error_bytes(2);
    let (h7, l7) = error_bytes(7);
    for _ in 0..3 {
        ch.observe(VALUE_ERROR, h2, l2);
    }
    assert_eq!(ch.active_code().map(|c| c.digit()), Some(2));

    for _ in 0..2 {
        assert_eq!(ch.observe(VALUE_ERROR, h7, l7), None);
    }
    match ch.observe(VALUE_ERROR, h7, l7) {
        Some(ErrorEvent::Raised(code)) => assert_eq!(code.digit(), 7),
        other => panic!("expected Raised(E7), got {other:?}"),
    }
}

#[test]
fn repeated_confirmations_do_not_republish() {
    let mut ch = channel();
    let (high, low) = error_bytes(4);
    for _ in 0..3 {
        ch.observe(VALUE_ERROR, high, low);
    }
    // Same code keeps matching; the threshold is reached again and again but
    // the active code is unchanged, so nothing further is emitted.
    for _ in 0..12 {
        assert_eq!(ch.observe(VALUE_ERROR, high, low), None);
    }
}

#[test]
fn reset_forgets_active_code_and_counters() {
    let mut ch = channel();
    let (high, low) = error_bytes(6);
    for _ in 0..3 {
        ch.observe(VALUE_ERROR, high, low);
    }
    assert!(ch.is_active());

    ch.reset();
    assert!(!ch.is_active());
    assert_eq!(ch.active_code(), None);

    // Confirmation starts from scratch.
    assert_eq!(ch.observe(VALUE_ERROR, high, low), None);
    assert_eq!(ch.observe(VALUE_ERROR, high, low), None);
    assert!(matches!(
        ch.observe(VALUE_ERROR, high, low),
        Some(ErrorEvent::Raised(_))
    ));
}
