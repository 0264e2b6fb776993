//! Simulated bus end-to-end: injected frames reach the capture through the
//! pump thread and decode into publications.

use std::time::Duration;

use drywatch_core::config::TimingCfg;
use drywatch_core::mocks::{FrameSpec, RecordingSink};
use drywatch_core::{DeviceState, EdgePump, SnifferBuilder};
use drywatch_hardware::simulated_pair;

#[test]
fn injected_frames_flow_through_pump_and_capture() {
    // Generous bit timeout: the pump thread may be descheduled mid-frame on a
    // loaded test host, and this test is about the data path, not timing.
    let timing = TimingCfg {
        bit_timeout_us: 50_000,
        ..TimingCfg::default()
    };
    let (mut sniffer, capture) = SnifferBuilder::new()
        .with_sink(RecordingSink::default())
        .with_timing(timing)
        .build()
        .expect("build sniffer");

    let (injector, bus) = simulated_pair(32, Duration::from_millis(10));
    let pump = EdgePump::spawn(bus, capture, Duration::from_millis(5));

    let bytes = FrameSpec::default().to_bytes();
    for _ in 0..10 {
        assert!(injector.inject(&bytes));
    }

    // Poll until every frame has been claimed, bounded for safety.
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while sniffer.stats().valid_frames < 10 && std::time::Instant::now() < deadline {
        sniffer.poll();
        std::thread::sleep(Duration::from_millis(1));
    }

    drop(pump);

    assert_eq!(sniffer.stats().valid_frames, 10);
    assert_eq!(sniffer.device_state(), DeviceState::Active);
    let sink = sniffer.sink();
    assert_eq!(sink.set_temp, vec![Some(45.0)]);
    assert_eq!(sink.material, vec!["PLA"]);
    assert_eq!(sink.drying_time, vec!["00:00:00", "01:30:00"]);
}

#[test]
fn pump_shuts_down_cleanly_when_dropped() {
    let (_sniffer, capture) = SnifferBuilder::new()
        .with_sink(RecordingSink::default())
        .build()
        .expect("build sniffer");

    let (injector, bus) = simulated_pair(4, Duration::ZERO);
    let pump = EdgePump::spawn(bus, capture, Duration::from_millis(5));
    std::thread::sleep(Duration::from_millis(20));
    drop(pump); // joins the thread; must not hang
    drop(injector);
}
