//! Pure decoders for a validated frame's payload bytes.
//!
//! Every function here is deterministic, allocation-free and total: undecodable
//! input maps to a sentinel ([`VALUE_INVALID`], `None`, `Unknown`), never to an
//! error. Single-bit corruption is tolerated via Hamming-distance matching.

use crate::tables::{
    DIGIT_PATTERNS, DP_BIT, LETTER_INDEX, MATERIAL_FINGERPRINTS, SEGMENT_MASK,
};

/// Sentinel: the digit pair decoded to the error-code letter ("E" glyph).
pub const VALUE_ERROR: u8 = 225;
/// Sentinel: the digit pair matched no table entry within distance 1.
pub const VALUE_INVALID: u8 = 255;

/// Shortest frame the decoder understands (address byte through seconds pair).
pub const MIN_FRAME_LEN: usize = 22;

// Payload byte offsets within a validated frame.
const OFF_CURSOR: usize = 2;
const OFF_SET_TEMP: usize = 3;
const OFF_PROCESS_TEMP: usize = 5;
const OFF_UNITS: usize = 7;
const OFF_MATERIAL: usize = 8;
const OFF_HUMIDITY: usize = 14;
const OFF_HOURS: usize = 16;
const OFF_MINUTES: usize = 18;
const OFF_SECONDS: usize = 20;

/// Count of differing bits between two bytes.
#[inline]
pub fn hamming(a: u8, b: u8) -> u32 {
    (a ^ b).count_ones()
}

/// Decode a two-byte seven-segment pair into a value in [0, 99].
///
/// Each byte is masked of its decimal-point segment and matched against the
/// pattern table, accepting a single-bit mismatch as corrected; an exact match
/// found later in the scan overrides an earlier distance-1 guess. Returns
/// [`VALUE_INVALID`] when either half stays unmatched and [`VALUE_ERROR`] when
/// the tens half is the error-code letter. On temperature displays a set
/// decimal point on the high byte means "add 100" (readings above 99 degrees).
pub fn decode_digit_pair(high: u8, low: u8, is_temperature: bool) -> u8 {
    let high_m = high & SEGMENT_MASK;
    let low_m = low & SEGMENT_MASK;

    let mut tens = VALUE_INVALID;
    let mut ones = VALUE_INVALID;

    for (i, pat) in DIGIT_PATTERNS.iter().enumerate() {
        let pat_m = pat & SEGMENT_MASK;

        if pat_m == high_m {
            tens = (i * 10) as u8;
        } else if tens == VALUE_INVALID && hamming(pat_m, high_m) == 1 {
            tens = (i * 10) as u8;
        }

        if pat_m == low_m {
            ones = i as u8;
        } else if ones == VALUE_INVALID && hamming(pat_m, low_m) == 1 {
            ones = i as u8;
        }
    }

    if tens == VALUE_INVALID || ones == VALUE_INVALID {
        return VALUE_INVALID;
    }
    if usize::from(tens) == LETTER_INDEX * 10 {
        return VALUE_ERROR;
    }
    if is_temperature && (high & DP_BIT) != 0 {
        tens += 100;
    }
    tens + ones
}

/// Identify the selected material from the six-byte checksum region.
///
/// XOR-folds the region and matches the result against the fingerprint table:
/// exact first, then within Hamming distance 1. `None` when nothing qualifies.
pub fn decode_material(region: &[u8; 6]) -> Option<usize> {
    let mut folded = 0u8;
    for b in region {
        folded ^= b;
    }
    MATERIAL_FINGERPRINTS
        .iter()
        .position(|&f| f == folded)
        .or_else(|| {
            MATERIAL_FINGERPRINTS
                .iter()
                .position(|&f| hamming(f, folded) <= 1)
        })
}

/// Menu cursor position, from the frame's status-byte bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cursor {
    Idle,
    Time,
    Material,
    SetPoint,
    ProcessValue,
    Unknown,
}

/// Bits of the status byte that carry the cursor position.
pub const CURSOR_MASK: u8 = 0x8E;

impl Cursor {
    pub fn from_status_byte(val: u8) -> Self {
        match val & CURSOR_MASK {
            0x00 => Cursor::Idle,
            0x02 => Cursor::Time,
            0x04 => Cursor::Material,
            0x08 => Cursor::SetPoint,
            0x80 => Cursor::ProcessValue,
            _ => Cursor::Unknown,
        }
    }

    /// Name as the device documentation spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Cursor::Idle => "Idle",
            Cursor::Time => "Time",
            Cursor::Material => "Material",
            Cursor::SetPoint => "SV",
            Cursor::ProcessValue => "PV",
            Cursor::Unknown => "Unknown",
        }
    }
}

/// Temperature units, from the frame's units byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Celsius,
    Fahrenheit,
    Unknown,
}

const UNITS_CELSIUS: u8 = 0xE5;
const UNITS_FAHRENHEIT: u8 = 0xEA;

impl Units {
    pub fn from_byte(val: u8) -> Self {
        match val {
            UNITS_CELSIUS => Units::Celsius,
            UNITS_FAHRENHEIT => Units::Fahrenheit,
            _ => Units::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Units::Celsius => "C",
            Units::Fahrenheit => "F",
            Units::Unknown => "Unknown",
        }
    }
}

/// Every candidate value decoded from one validated frame.
#[derive(Debug, Clone, Copy)]
pub struct Reading {
    pub set_temp: u8,
    pub process_temp: u8,
    pub humidity: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub material: Option<usize>,
    pub cursor: Cursor,
    pub units: Units,
    /// Raw process-temperature pair, kept for the error-code path.
    pub process_raw: (u8, u8),
}

impl Reading {
    /// Decode all channels at their fixed offsets. `None` when the frame is
    /// shorter than [`MIN_FRAME_LEN`].
    pub fn from_frame(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < MIN_FRAME_LEN {
            return None;
        }
        let material_region: &[u8; 6] = bytes[OFF_MATERIAL..OFF_MATERIAL + 6]
            .try_into()
            .ok()?;
        Some(Self {
            set_temp: decode_digit_pair(bytes[OFF_SET_TEMP], bytes[OFF_SET_TEMP + 1], true),
            process_temp: decode_digit_pair(
                bytes[OFF_PROCESS_TEMP],
                bytes[OFF_PROCESS_TEMP + 1],
                true,
            ),
            humidity: decode_digit_pair(bytes[OFF_HUMIDITY], bytes[OFF_HUMIDITY + 1], false),
            hours: decode_digit_pair(bytes[OFF_HOURS], bytes[OFF_HOURS + 1], false),
            minutes: decode_digit_pair(bytes[OFF_MINUTES], bytes[OFF_MINUTES + 1], false),
            seconds: decode_digit_pair(bytes[OFF_SECONDS], bytes[OFF_SECONDS + 1], false),
            material: decode_material(material_region),
            cursor: Cursor::from_status_byte(bytes[OFF_CURSOR]),
            units: Units::from_byte(bytes[OFF_UNITS]),
            process_raw: (bytes[OFF_PROCESS_TEMP], bytes[OFF_PROCESS_TEMP + 1]),
        })
    }
}
