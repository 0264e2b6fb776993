//! Simulated-bus wiring and the replay loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::WrapErr;

use drywatch_core::mocks::FrameSpec;
use drywatch_core::tables::{DIGIT_PATTERNS, LETTER_INDEX};
use drywatch_core::{EdgePump, SnifferBuilder};
use drywatch_hardware::{FrameInjector, simulated_pair};

use crate::sink;

pub fn run_simulation(
    cfg: &drywatch_config::Config,
    json: bool,
    frames: u32,
    interval_ms: u64,
    error: Option<u8>,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    let (mut sniffer, capture) = SnifferBuilder::new()
        .with_sink(sink::make_sink(json))
        .with_config(cfg)
        .build()
        .wrap_err("building sniffer")?;

    let (injector, bus) = simulated_pair(32, Duration::from_millis(interval_ms.max(1)));
    let _pump = EdgePump::spawn(bus, capture, Duration::from_millis(5));

    tracing::info!(frames, interval_ms, error = ?error, "replaying synthetic frames");
    let feeder = std::thread::spawn(move || feed_frames(&injector, frames, error));

    // Poll until the feeder is done and the pump has drained, or ctrl-c.
    let quiet_window = Duration::from_millis(interval_ms.saturating_mul(5).max(200));
    let mut last_total = 0u64;
    let mut idle_since = Instant::now();
    while !shutdown.load(Ordering::Relaxed) {
        sniffer.poll();
        std::thread::sleep(Duration::from_millis(1));

        let stats = sniffer.stats();
        let total = stats.valid_frames + stats.invalid_frames;
        if total != last_total {
            last_total = total;
            idle_since = Instant::now();
        }
        if feeder.is_finished() && idle_since.elapsed() > quiet_window {
            break;
        }
    }

    if feeder.join().is_err() {
        tracing::warn!("frame feeder thread panicked");
    }

    let stats = sniffer.stats();
    if cfg.diagnostics.statistics {
        tracing::info!(
            valid = stats.valid_frames,
            invalid = stats.invalid_frames,
            dropped_bytes = stats.dropped_bytes,
            status = sniffer.device_state().as_str(),
            "replay finished"
        );
    }
    Ok(())
}

fn feed_frames(injector: &FrameInjector, frames: u32, error: Option<u8>) {
    let normal = FrameSpec::default().to_bytes();
    let error_frame = error.map(|digit| {
        FrameSpec {
            process_pair: Some((
                DIGIT_PATTERNS[LETTER_INDEX],
                DIGIT_PATTERNS[usize::from(digit.min(9))],
            )),
            ..FrameSpec::default()
        }
        .to_bytes()
    });

    for i in 0..frames {
        // Show the error on the middle third of the replay, if requested.
        let bytes = match &error_frame {
            Some(e) if i >= frames / 3 && i < 2 * frames / 3 => e,
            _ => &normal,
        };
        if !injector.inject(bytes) {
            break;
        }
    }
}
