//! Cooperative polling loop: timeouts, frame claiming, decode dispatch.

use std::sync::Arc;
use std::time::Instant;

use drywatch_traits::{Clock, Sink};

use crate::capture::{Frame, FrameStatus, FrameTap};
use crate::config::{BusCfg, TimingCfg};
use crate::decode::{MIN_FRAME_LEN, Reading};
use crate::filter::FilterBank;
use crate::hysteresis::{ErrorChannel, ErrorEvent};
use crate::state::{DeviceState, DeviceTracker};
use crate::stats::Stats;

/// Owns everything downstream of the capture: validation, decoding, the
/// filter bank, the error channel and the device state machine.
///
/// Runs in a single cooperative domain; each [`poll`](Self::poll) re-derives
/// its timeout decisions from the current clock, so there is nothing to
/// cancel and no state to tear down between iterations.
pub struct Supervisor<K: Sink> {
    tap: FrameTap,
    sink: K,
    bank: FilterBank,
    errors: ErrorChannel,
    device: DeviceTracker,
    bus: BusCfg,
    timing: TimingCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    last_frame_ms: u64,
    last_log_ms: u64,
    valid_frames: u64,
    invalid_frames: u64,
}

impl<K: Sink> Supervisor<K> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tap: FrameTap,
        mut sink: K,
        bank: FilterBank,
        errors: ErrorChannel,
        bus: BusCfg,
        timing: TimingCfg,
        clock: Arc<dyn Clock + Send + Sync>,
        epoch: Instant,
    ) -> Self {
        // Power-on defaults, as the stock display shows before the first frame.
        sink.drying_time("00:00:00");
        sink.error_status("OK");
        sink.dryer_status("Off");
        sink.temp_units("C");

        let now_ms = clock.ms_since(epoch);
        Self {
            tap,
            sink,
            bank,
            errors,
            device: DeviceTracker::new(),
            bus,
            timing,
            clock,
            epoch,
            last_frame_ms: now_ms,
            last_log_ms: now_ms,
            valid_frames: 0,
            invalid_frames: 0,
        }
    }

    /// One iteration of the polling loop.
    pub fn poll(&mut self) {
        self.check_bit_timeout();
        self.check_absence();
        if let Some(frame) = self.tap.claim() {
            self.process_frame(&frame);
            self.tap.release();
        }
    }

    pub fn device_state(&self) -> DeviceState {
        self.device.state()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            valid_frames: self.valid_frames,
            invalid_frames: self.invalid_frames,
            dropped_bytes: u64::from(self.tap.dropped_bytes()),
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Reclaim a frame whose stop condition was lost to bus noise.
    fn check_bit_timeout(&mut self) {
        if self.tap.status() != FrameStatus::Receiving {
            return;
        }
        let now_us = self.clock.us_since(self.epoch);
        if now_us.saturating_sub(self.tap.last_edge_us()) > self.timing.bit_timeout_us
            && self.tap.force_complete()
        {
            tracing::trace!("bit timeout, frame force-completed");
        }
    }

    /// Extended silence means the device is gone: reset every channel and
    /// republish sentinels so downstream consumers see "unknown", not stale
    /// values.
    fn check_absence(&mut self) {
        let now_ms = self.clock.ms_since(self.epoch);
        if now_ms.saturating_sub(self.last_frame_ms) <= self.timing.absence_timeout_ms {
            return;
        }
        if self.device.state() == DeviceState::Absent {
            return;
        }
        tracing::info!(
            timeout_ms = self.timing.absence_timeout_ms,
            "no valid frames, device absent"
        );
        self.device.set(DeviceState::Absent, &mut self.sink);
        self.bank.reset();
        self.errors.reset();
        self.sink.set_temp(None);
        self.sink.current_temp(None);
        self.sink.humidity(None);
        self.sink.drying_time("Unknown");
        self.sink.material("N/A");
        self.sink.cursor("N/A");
        self.sink.temp_units("N/A");
        self.sink.error_status("N/A");
    }

    fn process_frame(&mut self, frame: &Frame) {
        let bytes = frame.bytes();
        if bytes.len() < MIN_FRAME_LEN || bytes[0] != self.bus.address {
            // Line noise produces malformed frames routinely; count, don't report.
            self.invalid_frames = self.invalid_frames.wrapping_add(1);
            return;
        }
        self.valid_frames = self.valid_frames.wrapping_add(1);
        let now_ms = self.clock.ms_since(self.epoch);
        self.last_frame_ms = now_ms;

        if self.device.state() == DeviceState::Absent {
            self.device.set(DeviceState::Starting, &mut self.sink);
        }

        let Some(reading) = Reading::from_frame(bytes) else {
            return;
        };

        if now_ms.saturating_sub(self.last_log_ms) > self.timing.log_interval_ms {
            tracing::debug!(
                sv = reading.set_temp,
                pv = reading.process_temp,
                rh = reading.humidity,
                hh = reading.hours,
                mm = reading.minutes,
                ss = reading.seconds,
                material = ?reading.material,
                cursor = reading.cursor.as_str(),
                error = ?self.errors.active_code(),
                "decoded frame"
            );
            self.last_log_ms = now_ms;
        }

        match self.errors.observe(
            reading.process_temp,
            reading.process_raw.0,
            reading.process_raw.1,
        ) {
            Some(ErrorEvent::Raised(code)) => {
                tracing::warn!(%code, "device error confirmed");
                self.sink.error_status(&code.to_string());
                // The display shows the code instead of the temperature, so
                // the stale published reading is withdrawn.
                self.sink.current_temp(None);
                self.device.set(DeviceState::Error, &mut self.sink);
            }
            Some(ErrorEvent::Cleared) => {
                tracing::info!("device error cleared");
                self.sink.error_status("OK");
                if self.device.state() == DeviceState::Error {
                    self.device.set(DeviceState::Idle, &mut self.sink);
                }
            }
            None => {}
        }

        self.bank.apply(
            &reading,
            self.errors.is_active(),
            &mut self.device,
            &mut self.sink,
        );
    }
}
