//! Per-channel filter-bank policies, driven through decoded readings.

use drywatch_core::config::FilterBankCfg;
use drywatch_core::decode::{Cursor, Reading, Units};
use drywatch_core::filter::{Debounce, FilterBank};
use drywatch_core::mocks::RecordingSink;
use drywatch_core::state::{DeviceState, DeviceTracker};

fn reading() -> Reading {
    Reading {
        set_temp: 45,
        process_temp: 44,
        humidity: 60,
        hours: 1,
        minutes: 30,
        seconds: 0,
        material: Some(9),
        cursor: Cursor::SetPoint,
        units: Units::Celsius,
        process_raw: (0, 0),
    }
}

struct Harness {
    bank: FilterBank,
    device: DeviceTracker,
    sink: RecordingSink,
}

impl Harness {
    fn new() -> Self {
        Self {
            bank: FilterBank::new(FilterBankCfg::default()),
            device: DeviceTracker::new(),
            sink: RecordingSink::default(),
        }
    }

    fn feed(&mut self, r: &Reading) {
        self.bank.apply(r, false, &mut self.device, &mut self.sink);
    }

    fn feed_n(&mut self, r: &Reading, n: usize) {
        for _ in 0..n {
            self.feed(r);
        }
    }
}

#[test]
fn nth_observation_publishes_exactly_once() {
    let mut h = Harness::new();
    let r = reading();

    // set-temp threshold is 5
    h.feed_n(&r, 4);
    assert!(h.sink.set_temp.is_empty());
    h.feed(&r);
    assert_eq!(h.sink.set_temp, vec![Some(45.0)]);

    // further agreement stays quiet
    h.feed_n(&r, 20);
    assert_eq!(h.sink.set_temp, vec![Some(45.0)]);
}

#[test]
fn differing_observation_resets_the_streak() {
    let mut h = Harness::new();
    let mut r = reading();

    h.feed_n(&r, 4);
    r.set_temp = 46;
    h.feed(&r); // streak restarts at 1
    r.set_temp = 45;
    h.feed_n(&r, 4);
    assert!(h.sink.set_temp.is_empty());
    h.feed(&r);
    assert_eq!(h.sink.set_temp, vec![Some(45.0)]);
}

#[test]
fn set_temp_rejects_out_of_range_values() {
    let mut h = Harness::new();
    let mut r = reading();

    r.set_temp = 81; // above max_temp_c
    h.feed_n(&r, 20);
    r.set_temp = 225; // error sentinel
    h.feed_n(&r, 20);
    r.set_temp = 255; // undecodable
    h.feed_n(&r, 20);
    assert!(h.sink.set_temp.is_empty());
}

#[test]
fn set_temp_ignores_jumps_entirely() {
    let mut h = Harness::new();
    let mut r = reading();

    h.feed_n(&r, 5);
    assert_eq!(h.sink.set_temp, vec![Some(45.0)]);

    // 45 -> 55 is a >5 degree jump: discarded outright, however often seen.
    r.set_temp = 55;
    h.feed_n(&r, 50);
    assert_eq!(h.sink.set_temp, vec![Some(45.0)]);

    // A plausible neighbour is accepted normally.
    r.set_temp = 47;
    h.feed_n(&r, 5);
    assert_eq!(h.sink.set_temp, vec![Some(45.0), Some(47.0)]);
}

#[test]
fn process_temp_jump_needs_extended_agreement() {
    let mut h = Harness::new();
    let mut r = reading();

    h.feed_n(&r, 5);
    assert_eq!(h.sink.current_temp, vec![Some(44.0)]);

    // 44 -> 60 is a jump: the normal threshold of 5 is not enough...
    r.process_temp = 60;
    h.feed_n(&r, 9);
    assert_eq!(h.sink.current_temp, vec![Some(44.0)]);
    // ...but sustained agreement (10) is eventually accepted.
    h.feed(&r);
    assert_eq!(h.sink.current_temp, vec![Some(44.0), Some(60.0)]);
}

#[test]
fn process_temp_is_withheld_while_error_active() {
    let mut h = Harness::new();
    let r = reading();

    for _ in 0..20 {
        h.bank.apply(&r, true, &mut h.device, &mut h.sink);
    }
    assert!(h.sink.current_temp.is_empty());
}

#[test]
fn humidity_uses_plain_threshold() {
    let mut h = Harness::new();
    let r = reading();

    h.feed_n(&r, 2);
    assert!(h.sink.humidity.is_empty());
    h.feed(&r);
    assert_eq!(h.sink.humidity, vec![Some(60.0)]);
}

#[test]
fn time_publishes_formatted_and_drives_state() {
    let mut h = Harness::new();
    let r = reading();

    h.feed_n(&r, 2); // time threshold is 2
    assert_eq!(h.sink.drying_time, vec!["01:30:00"]);
    assert_eq!(h.device.state(), DeviceState::Active);
    assert_eq!(h.sink.dryer_status, vec!["Drying"]);

    // Zero time -> Idle
    let mut r0 = reading();
    r0.hours = 0;
    r0.minutes = 0;
    r0.seconds = 0;
    h.feed_n(&r0, 2);
    assert_eq!(h.sink.drying_time, vec!["01:30:00", "00:00:00"]);
    assert_eq!(h.device.state(), DeviceState::Idle);
}

#[test]
fn time_rejects_out_of_range_fields() {
    let mut h = Harness::new();
    let mut r = reading();

    r.hours = 49;
    h.feed_n(&r, 10);
    r.hours = 1;
    r.minutes = 60;
    h.feed_n(&r, 10);
    r.minutes = 30;
    r.seconds = 225;
    h.feed_n(&r, 10);
    assert!(h.sink.drying_time.is_empty());
}

#[test]
fn error_state_blocks_time_driven_transitions() {
    let mut h = Harness::new();
    let r = reading();

    h.device.set(DeviceState::Error, &mut h.sink);
    h.feed_n(&r, 2);
    // Time still publishes, but the state machine stays in Error.
    assert_eq!(h.sink.drying_time, vec!["01:30:00"]);
    assert_eq!(h.device.state(), DeviceState::Error);
}

#[test]
fn material_confirms_slowly() {
    let mut h = Harness::new();
    let r = reading();

    h.feed_n(&r, 9);
    assert!(h.sink.material.is_empty());
    h.feed(&r);
    assert_eq!(h.sink.material, vec!["PLA"]);
}

#[test]
fn cursor_publishes_display_names() {
    let mut h = Harness::new();
    let r = reading();

    h.feed_n(&r, 3);
    assert_eq!(h.sink.cursor, vec!["SV"]);

    let mut r2 = reading();
    r2.cursor = Cursor::ProcessValue;
    h.feed_n(&r2, 3);
    assert_eq!(h.sink.cursor, vec!["SV", "PV"]);
}

#[test]
fn unknown_cursor_never_reaches_the_filter() {
    let mut h = Harness::new();
    let mut r = reading();
    r.cursor = Cursor::Unknown;
    h.feed_n(&r, 10);
    assert!(h.sink.cursor.is_empty());
}

#[test]
fn units_publish_immediately_on_change() {
    let mut h = Harness::new();
    let mut r = reading();

    h.feed(&r);
    assert_eq!(h.sink.temp_units, vec!["C"]);
    h.feed_n(&r, 5);
    assert_eq!(h.sink.temp_units, vec!["C"]);

    r.units = Units::Fahrenheit;
    h.feed(&r);
    assert_eq!(h.sink.temp_units, vec!["C", "F"]);

    r.units = Units::Unknown;
    h.feed_n(&r, 5);
    assert_eq!(h.sink.temp_units, vec!["C", "F"]);
}

#[test]
fn reset_republishes_after_reconnect() {
    let mut h = Harness::new();
    let r = reading();

    h.feed_n(&r, 5);
    assert_eq!(h.sink.set_temp, vec![Some(45.0)]);

    h.bank.reset();
    h.feed_n(&r, 5);
    // Same value published again because the bank forgot it.
    assert_eq!(h.sink.set_temp, vec![Some(45.0), Some(45.0)]);
}

#[test]
fn generic_debounce_escalation_threshold() {
    let mut d: Debounce<u8> = Debounce::new(2);
    assert_eq!(d.observe_with(9, 4), None);
    assert_eq!(d.observe_with(9, 4), None);
    assert_eq!(d.observe_with(9, 4), None);
    assert_eq!(d.observe_with(9, 4), Some(9));
}
