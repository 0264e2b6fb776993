//! Fixed lookup tables for the display protocol.
//!
//! Decoding is pure data-driven matching against these constants; no dynamic
//! dispatch is involved anywhere in the decode path.

/// Seven-segment bit patterns as the display controller transmits them.
///
/// Indices 0-9 are the digits; index 10 is the letter the device uses for
/// error codes ("E" plus a digit).
pub const DIGIT_PATTERNS: [u8; 11] = [
    0xAF, 0xA0, 0xCB, 0xE9, 0xE4, 0x6D, 0x6F, 0xA8, 0xEF, 0xED, 0x4F,
];

/// Table index of the error-code letter in [`DIGIT_PATTERNS`].
pub const LETTER_INDEX: usize = 10;

/// The decimal-point segment. Carries "value above 99" on temperature
/// displays and must be masked off before pattern comparison.
pub const DP_BIT: u8 = 0x10;

/// Mask clearing the decimal-point segment.
pub const SEGMENT_MASK: u8 = !DP_BIT;

/// XOR fingerprints of the material-selection region (frame bytes 8-13),
/// one per selectable material.
pub const MATERIAL_FINGERPRINTS: [u8; 12] = [
    0x27, 0x37, 0xEB, 0xFD, 0xE3, 0x19, 0x83, 0xFE, 0xF3, 0x93, 0x97, 0xE1,
];

/// Material names, in [`MATERIAL_FINGERPRINTS`] order.
pub const MATERIAL_NAMES: [&str; 12] = [
    "ABS", "ASA", "PETG", "PC", "PA", "PET", "PLA-CF", "PETG-CF", "PA-CF", "PLA", "TPU", "PP",
];
