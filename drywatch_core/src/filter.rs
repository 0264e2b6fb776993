//! Debounce filtering between raw per-frame decodes and publication.
//!
//! One generic [`Debounce`] primitive, instantiated per channel with its own
//! threshold and wrapped by [`FilterBank`] with the per-channel policies
//! (range rejection, jump suppression, escalated confirmation).

use drywatch_traits::Sink;

use crate::config::FilterBankCfg;
use crate::decode::{Cursor, Reading, Units, VALUE_ERROR};
use crate::state::{DeviceState, DeviceTracker};
use crate::tables::MATERIAL_NAMES;
use crate::util::format_hms;

/// Requires several consecutive identical observations before accepting a
/// value as stable, and forwards it at most once until it changes again.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    last_published: Option<T>,
    candidate: Option<T>,
    count: u8,
    repeats: u8,
}

impl<T: PartialEq + Copy> Debounce<T> {
    pub fn new(repeats: u8) -> Self {
        Self {
            last_published: None,
            candidate: None,
            count: 0,
            repeats: repeats.max(1),
        }
    }

    /// Feed one observation; returns the value when it just became stable and
    /// differs from the last published one.
    pub fn observe(&mut self, value: T) -> Option<T> {
        let repeats = self.repeats;
        self.observe_with(value, repeats)
    }

    /// Like [`observe`](Self::observe) with a caller-chosen threshold, for
    /// channels that escalate confirmation in special cases.
    pub fn observe_with(&mut self, value: T, required: u8) -> Option<T> {
        if self.candidate == Some(value) {
            self.count = self.count.saturating_add(1);
            if self.count >= required {
                self.count = 0;
                if self.last_published != Some(value) {
                    self.last_published = Some(value);
                    return Some(value);
                }
            }
            None
        } else {
            self.candidate = Some(value);
            self.count = 1;
            None
        }
    }

    /// Last value forwarded for publication, if any.
    pub fn last(&self) -> Option<T> {
        self.last_published
    }

    /// Back to the never-published state; the next stable value is forwarded
    /// even if it equals the one published before the reset.
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_published = None;
    }
}

/// All per-channel filters plus their publication policies.
pub struct FilterBank {
    cfg: FilterBankCfg,
    set_temp: Debounce<u8>,
    process_temp: Debounce<u8>,
    humidity: Debounce<u8>,
    time: Debounce<u32>,
    material: Debounce<usize>,
    cursor: Debounce<Cursor>,
    last_units: Units,
}

impl FilterBank {
    pub fn new(cfg: FilterBankCfg) -> Self {
        Self {
            set_temp: Debounce::new(cfg.set_temp_repeats),
            process_temp: Debounce::new(cfg.process_temp_repeats),
            humidity: Debounce::new(cfg.humidity_repeats),
            time: Debounce::new(cfg.time_repeats),
            material: Debounce::new(cfg.material_repeats),
            cursor: Debounce::new(cfg.cursor_repeats),
            last_units: Units::Unknown,
            cfg,
        }
    }

    /// Feed one frame's decoded candidates through every channel, publishing
    /// whatever became stable.
    pub fn apply<K: Sink>(
        &mut self,
        r: &Reading,
        error_active: bool,
        device: &mut DeviceTracker,
        sink: &mut K,
    ) {
        // Set-point temperature: hard range rejection, and once initialized a
        // jump beyond max_step_c is noise and does not even touch the candidate.
        if r.set_temp < VALUE_ERROR && r.set_temp <= self.cfg.max_temp_c {
            let jump = self
                .set_temp
                .last()
                .is_some_and(|last| last.abs_diff(r.set_temp) > self.cfg.max_step_c);
            if !jump && let Some(v) = self.set_temp.observe(r.set_temp) {
                sink.set_temp(Some(f32::from(v)));
            }
        }

        // Process temperature: same range rejection, but a step change is not
        // discarded; it needs a longer run of agreement before acceptance.
        // Withheld entirely while an error code occupies the display.
        if r.process_temp < VALUE_ERROR && r.process_temp <= self.cfg.max_temp_c && !error_active {
            let jump = self
                .process_temp
                .last()
                .is_some_and(|last| last.abs_diff(r.process_temp) > self.cfg.max_step_c);
            let required = if jump {
                self.cfg.process_jump_repeats
            } else {
                self.cfg.process_temp_repeats
            };
            if let Some(v) = self.process_temp.observe_with(r.process_temp, required) {
                if jump {
                    tracing::info!(temp = v, "temperature step accepted after extended agreement");
                }
                sink.current_temp(Some(f32::from(v)));
            }
        }

        // Humidity: plain threshold filter.
        if r.humidity < VALUE_ERROR
            && let Some(v) = self.humidity.observe(r.humidity)
        {
            sink.humidity(Some(f32::from(v)));
        }

        // Drying time: debounced on total seconds; a confirmation also drives
        // the coarse device state unless an error holds it.
        if r.hours <= self.cfg.max_hours && r.minutes < 60 && r.seconds < 60 {
            let total = u32::from(r.hours) * 3600 + u32::from(r.minutes) * 60 + u32::from(r.seconds);
            if let Some(total) = self.time.observe(total) {
                sink.drying_time(&format_hms(total));
                if device.state() != DeviceState::Error {
                    let next = if total > 0 {
                        DeviceState::Active
                    } else {
                        DeviceState::Idle
                    };
                    device.set(next, sink);
                }
            }
        }

        // Material: deliberately slow, the selection rarely changes.
        if let Some(idx) = r.material
            && let Some(idx) = self.material.observe(idx)
        {
            sink.material(MATERIAL_NAMES[idx]);
        }

        // Cursor
        if r.cursor != Cursor::Unknown
            && let Some(c) = self.cursor.observe(r.cursor)
        {
            sink.cursor(c.as_str());
        }

        // Units bypass the debounce: published immediately on change.
        if r.units != Units::Unknown && r.units != self.last_units {
            self.last_units = r.units;
            sink.temp_units(r.units.as_str());
        }
    }

    /// Reset every channel to the unpublished state (device went absent).
    pub fn reset(&mut self) {
        self.set_temp.reset();
        self.process_temp.reset();
        self.humidity.reset();
        self.time.reset();
        self.material.reset();
        self.cursor.reset();
        self.last_units = Units::Unknown;
    }
}
