//! Error-code channel with asymmetric hysteresis.
//!
//! The display signals a device fault by replacing the process temperature
//! with the error letter plus a digit. Confirming a code is quick; clearing
//! one intentionally takes a much longer run of normal readings, so a code
//! never flickers in and out on line noise.

use std::fmt;

use crate::config::ErrorCfg;
use crate::decode::VALUE_ERROR;
use crate::tables::{DIGIT_PATTERNS, LETTER_INDEX, SEGMENT_MASK};

/// One device error code, e.g. `E3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(u8);

impl ErrorCode {
    pub fn digit(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Edge emitted when the hysteresis state actually changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorEvent {
    /// A code reached the confirm threshold and became active.
    Raised(ErrorCode),
    /// Enough normal readings accumulated; no code is active anymore.
    Cleared,
}

/// Hysteresis state for the error channel.
#[derive(Debug)]
pub struct ErrorChannel {
    cfg: ErrorCfg,
    candidate: Option<ErrorCode>,
    active: Option<ErrorCode>,
    rising: u8,
    falling: u8,
}

/// Exact masked match of the low byte against the pattern table; no error
/// correction here, a corrupted code digit is treated as noise.
fn exact_code_digit(low: u8) -> Option<u8> {
    let low_m = low & SEGMENT_MASK;
    DIGIT_PATTERNS
        .iter()
        .position(|p| p & SEGMENT_MASK == low_m)
        .map(|i| i as u8)
}

impl ErrorChannel {
    pub fn new(cfg: ErrorCfg) -> Self {
        Self {
            cfg,
            candidate: None,
            active: None,
            rising: 0,
            falling: 0,
        }
    }

    /// Whether an error code is currently confirmed.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_code(&self) -> Option<ErrorCode> {
        self.active
    }

    /// Feed one frame's process-temperature decode.
    ///
    /// An error observation requires the digit decode to have produced the
    /// error sentinel *and* the masked high byte to equal the letter pattern
    /// exactly; anything else on the error path (unmatched low byte, a merely
    /// error-corrected letter) is noise and counts neither way.
    pub fn observe(&mut self, process_value: u8, high: u8, low: u8) -> Option<ErrorEvent> {
        if process_value == VALUE_ERROR {
            if high & SEGMENT_MASK != DIGIT_PATTERNS[LETTER_INDEX] & SEGMENT_MASK {
                return None;
            }
            let Some(digit) = exact_code_digit(low) else {
                tracing::trace!(high, low, "unrecognized error pattern");
                return None;
            };
            let code = ErrorCode(digit);

            if self.candidate == Some(code) {
                self.rising = self.rising.saturating_add(1);
                self.falling = 0;
                if self.rising >= self.cfg.confirm_repeats {
                    self.rising = 0;
                    if self.active != Some(code) {
                        self.active = Some(code);
                        return Some(ErrorEvent::Raised(code));
                    }
                }
            } else {
                self.candidate = Some(code);
                self.rising = 1;
                self.falling = 0;
            }
            None
        } else if self.active.is_some() {
            self.falling = self.falling.saturating_add(1);
            self.rising = 0;
            if self.falling >= self.cfg.clear_repeats {
                self.active = None;
                self.candidate = None;
                self.falling = 0;
                return Some(ErrorEvent::Cleared);
            }
            None
        } else {
            self.candidate = None;
            self.rising = 0;
            self.falling = 0;
            None
        }
    }

    /// Forget everything (device went absent).
    pub fn reset(&mut self) {
        self.candidate = None;
        self.active = None;
        self.rising = 0;
        self.falling = 0;
    }
}
