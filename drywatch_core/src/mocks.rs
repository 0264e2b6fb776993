//! Test and helper mocks for drywatch_core.

use drywatch_traits::{Level, Sink};

use crate::capture::EdgeCapture;
use crate::decode::{Cursor, MIN_FRAME_LEN, Units};
use crate::tables::{DIGIT_PATTERNS, DP_BIT, MATERIAL_FINGERPRINTS};

/// Sink that records every publication per channel, for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub set_temp: Vec<Option<f32>>,
    pub current_temp: Vec<Option<f32>>,
    pub humidity: Vec<Option<f32>>,
    pub drying_time: Vec<String>,
    pub material: Vec<String>,
    pub cursor: Vec<String>,
    pub temp_units: Vec<String>,
    pub error_status: Vec<String>,
    pub dryer_status: Vec<String>,
}

impl Sink for RecordingSink {
    fn set_temp(&mut self, value: Option<f32>) {
        self.set_temp.push(value);
    }
    fn current_temp(&mut self, value: Option<f32>) {
        self.current_temp.push(value);
    }
    fn humidity(&mut self, value: Option<f32>) {
        self.humidity.push(value);
    }
    fn drying_time(&mut self, hhmmss: &str) {
        self.drying_time.push(hhmmss.to_string());
    }
    fn material(&mut self, name: &str) {
        self.material.push(name.to_string());
    }
    fn cursor(&mut self, name: &str) {
        self.cursor.push(name.to_string());
    }
    fn temp_units(&mut self, units: &str) {
        self.temp_units.push(units.to_string());
    }
    fn error_status(&mut self, code: &str) {
        self.error_status.push(code.to_string());
    }
    fn dryer_status(&mut self, status: &str) {
        self.dryer_status.push(status.to_string());
    }
}

/// Sink that discards everything.
pub struct NullSink;

impl Sink for NullSink {
    fn set_temp(&mut self, _value: Option<f32>) {}
    fn current_temp(&mut self, _value: Option<f32>) {}
    fn humidity(&mut self, _value: Option<f32>) {}
    fn drying_time(&mut self, _hhmmss: &str) {}
    fn material(&mut self, _name: &str) {}
    fn cursor(&mut self, _name: &str) {}
    fn temp_units(&mut self, _units: &str) {}
    fn error_status(&mut self, _code: &str) {}
    fn dryer_status(&mut self, _status: &str) {}
}

/// Two-digit value as its seven-segment byte pair (tens, ones).
pub fn segment_pair(value: u8) -> (u8, u8) {
    (
        DIGIT_PATTERNS[usize::from((value / 10) % 10)],
        DIGIT_PATTERNS[usize::from(value % 10)],
    )
}

/// Temperature as a byte pair; values above 99 set the decimal point on the
/// tens byte, the way the display encodes its extended range.
pub fn temperature_pair(value: u8) -> (u8, u8) {
    if value > 99 {
        let (tens, ones) = segment_pair(value - 100);
        (tens | DP_BIT, ones)
    } else {
        segment_pair(value)
    }
}

fn cursor_byte(cursor: Cursor) -> u8 {
    match cursor {
        Cursor::Idle => 0x00,
        Cursor::Time => 0x02,
        Cursor::Material => 0x04,
        Cursor::SetPoint => 0x08,
        Cursor::ProcessValue => 0x80,
        Cursor::Unknown => 0x06, // no table entry under the cursor mask
    }
}

fn units_byte(units: Units) -> u8 {
    match units {
        Units::Celsius => 0xE5,
        Units::Fahrenheit => 0xEA,
        Units::Unknown => 0x00,
    }
}

/// Describes one well-formed frame for tests and benches.
#[derive(Debug, Clone, Copy)]
pub struct FrameSpec {
    pub address: u8,
    pub set_temp: u8,
    pub process_temp: u8,
    pub humidity: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub material_idx: usize,
    pub cursor: Cursor,
    pub units: Units,
    /// Overrides the process-temperature byte pair (error-glyph frames).
    pub process_pair: Option<(u8, u8)>,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            address: 0x7E,
            set_temp: 45,
            process_temp: 44,
            humidity: 60,
            hours: 1,
            minutes: 30,
            seconds: 0,
            material_idx: 9, // PLA
            cursor: Cursor::SetPoint,
            units: Units::Celsius,
            process_pair: None,
        }
    }
}

impl FrameSpec {
    /// Encode at the wire offsets the decoder expects.
    pub fn to_bytes(self) -> [u8; MIN_FRAME_LEN] {
        let mut out = [0u8; MIN_FRAME_LEN];
        out[0] = self.address;
        out[2] = cursor_byte(self.cursor);
        (out[3], out[4]) = temperature_pair(self.set_temp);
        (out[5], out[6]) = self
            .process_pair
            .unwrap_or_else(|| temperature_pair(self.process_temp));
        out[7] = units_byte(self.units);
        // Any six bytes folding to the fingerprint identify the material.
        out[8] = MATERIAL_FINGERPRINTS[self.material_idx];
        (out[14], out[15]) = segment_pair(self.humidity);
        (out[16], out[17]) = segment_pair(self.hours);
        (out[18], out[19]) = segment_pair(self.minutes);
        (out[20], out[21]) = segment_pair(self.seconds);
        out
    }
}

/// Drive a framed byte sequence through the interrupt-side handle the way the
/// wire would: start condition, eight data-valid clock edges per byte plus
/// the acknowledgement slot, stop condition.
pub fn replay_frame(capture: &mut EdgeCapture, bytes: &[u8]) {
    capture.on_data_edge(Level::High, Level::Low); // start
    for &byte in bytes {
        for bit in (0..8).rev() {
            capture.on_clock_rise(Level::from((byte >> bit) & 1 == 1));
        }
        capture.on_clock_rise(Level::Low); // acknowledgement slot
    }
    capture.on_data_edge(Level::High, Level::High); // stop
}
