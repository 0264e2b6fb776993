#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core bus-monitoring logic (hardware-agnostic).
//!
//! This crate reconstructs and decodes the frames a dryer's display controller
//! exchanges with its mainboard, without ever driving the bus. Edges arrive
//! through `drywatch_traits::EdgeSource`; stable decoded values leave through
//! `drywatch_traits::Sink`.
//!
//! ## Architecture
//!
//! - **Capture**: edge reactions assembling bits into a shared frame buffer
//!   (`capture` module); single-writer atomics, safe against a preemptive
//!   edge domain
//! - **Supervision**: cooperative polling loop with bit/absence timeouts
//!   (`supervisor` module)
//! - **Decoding**: pure table-driven payload decoders with 1-bit error
//!   correction (`decode`, `tables` modules)
//! - **Filtering**: one generic debounce primitive instantiated per channel
//!   (`filter` module), plus asymmetric error hysteresis (`hysteresis`)
//! - **State**: coarse absent/starting/idle/active/error machine (`state`)
//!
//! Data flows one direction: edges -> frame buffer -> supervisor -> decoder
//! -> filter bank -> publication callbacks.

// Module declarations
pub mod capture;
pub mod config;
pub mod decode;
pub mod error;
pub mod filter;
pub mod hysteresis;
pub mod mocks;
pub mod pump;
pub mod state;
pub mod stats;
pub mod supervisor;
pub mod tables;
pub mod util;

pub use capture::{EdgeCapture, FRAME_CAPACITY, Frame, FrameStatus, FrameTap};
pub use config::{BusCfg, ErrorCfg, FilterBankCfg, TimingCfg};
pub use decode::{Cursor, MIN_FRAME_LEN, Reading, Units, VALUE_ERROR, VALUE_INVALID};
pub use error::{BuildError, Result};
pub use filter::{Debounce, FilterBank};
pub use hysteresis::{ErrorChannel, ErrorCode, ErrorEvent};
pub use pump::EdgePump;
pub use state::{DeviceState, DeviceTracker};
pub use stats::Stats;
pub use supervisor::Supervisor;

use std::marker::PhantomData;
use std::sync::Arc;

use drywatch_traits::clock::{Clock, MonotonicClock};
use drywatch_traits::Sink;

/// The assembled monitor: a [`Supervisor`] behind a small facade.
///
/// Built together with its [`EdgeCapture`] twin; hand the capture handle to
/// whatever delivers edges (an [`EdgePump`], or interrupt glue) and poll the
/// sniffer from the cooperative loop.
pub struct Sniffer<K: Sink> {
    supervisor: Supervisor<K>,
}

impl<K: Sink> Sniffer<K> {
    /// One iteration of the polling loop.
    pub fn poll(&mut self) {
        self.supervisor.poll();
    }

    pub fn device_state(&self) -> DeviceState {
        self.supervisor.device_state()
    }

    pub fn stats(&self) -> Stats {
        self.supervisor.stats()
    }

    pub fn sink(&self) -> &K {
        self.supervisor.sink()
    }

    pub fn sink_mut(&mut self) -> &mut K {
        self.supervisor.sink_mut()
    }
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Builder for [`Sniffer`]. The sink is mandatory and tracked in the type
/// state; everything else defaults to the values observed on the real device.
pub struct SnifferBuilder<K, S> {
    sink: Option<K>,
    bus: Option<BusCfg>,
    timing: Option<TimingCfg>,
    filters: Option<FilterBankCfg>,
    errors: Option<ErrorCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _s: PhantomData<S>,
}

impl Default for SnifferBuilder<(), Missing> {
    fn default() -> Self {
        Self {
            sink: None,
            bus: None,
            timing: None,
            filters: None,
            errors: None,
            clock: None,
            _s: PhantomData,
        }
    }
}

impl SnifferBuilder<(), Missing> {
    /// Start building a [`Sniffer`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the publication sink; advances the type state so `build` is
    /// only callable once this exists.
    pub fn with_sink<K: Sink>(self, sink: K) -> SnifferBuilder<K, Set> {
        let SnifferBuilder {
            sink: _,
            bus,
            timing,
            filters,
            errors,
            clock,
            _s: _,
        } = self;
        SnifferBuilder {
            sink: Some(sink),
            bus,
            timing,
            filters,
            errors,
            clock,
            _s: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state
impl<K, S> SnifferBuilder<K, S> {
    pub fn with_bus(mut self, bus: BusCfg) -> Self {
        self.bus = Some(bus);
        self
    }
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_filters(mut self, filters: FilterBankCfg) -> Self {
        self.filters = Some(filters);
        self
    }
    pub fn with_errors(mut self, errors: ErrorCfg) -> Self {
        self.errors = Some(errors);
        self
    }
    /// Take every tunable from a parsed config file in one call.
    pub fn with_config(self, cfg: &drywatch_config::Config) -> Self {
        self.with_bus(BusCfg::from(cfg))
            .with_timing(TimingCfg::from(cfg))
            .with_filters(FilterBankCfg::from(cfg))
            .with_errors(ErrorCfg::from(cfg))
    }
    /// Provide a custom clock implementation; defaults to MonotonicClock when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

impl<K: Sink> SnifferBuilder<K, Set> {
    /// Validate and build, returning the sniffer together with the
    /// interrupt-side capture handle.
    pub fn build(self) -> Result<(Sniffer<K>, EdgeCapture)> {
        let SnifferBuilder {
            sink,
            bus,
            timing,
            filters,
            errors,
            clock,
            _s: _,
        } = self;

        // The type state guarantees the sink is present.
        let sink = sink.ok_or_else(|| {
            eyre::Report::new(BuildError::InvalidConfig("publication sink missing"))
        })?;
        let bus = bus.unwrap_or_default();
        let timing = timing.unwrap_or_default();
        let filters = filters.unwrap_or_default();
        let errors = errors.unwrap_or_default();

        // Validate configs (non-panicking; return typed errors)
        if timing.bit_timeout_us == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "bit_timeout_us must be >= 1",
            )));
        }
        if timing.absence_timeout_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "absence_timeout_ms must be >= 1",
            )));
        }
        if timing.log_interval_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "log_interval_ms must be >= 1",
            )));
        }
        if filters.set_temp_repeats == 0
            || filters.process_temp_repeats == 0
            || filters.humidity_repeats == 0
            || filters.time_repeats == 0
            || filters.material_repeats == 0
            || filters.cursor_repeats == 0
        {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "every repeat threshold must be >= 1",
            )));
        }
        if filters.process_jump_repeats < filters.process_temp_repeats {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "process_jump_repeats must be >= process_temp_repeats",
            )));
        }
        if filters.max_temp_c == 0 || filters.max_step_c == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "temperature limits must be >= 1",
            )));
        }
        if filters.max_hours == 0 || filters.max_hours > 99 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "max_hours must be in [1, 99]",
            )));
        }
        if errors.confirm_repeats == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "confirm_repeats must be >= 1",
            )));
        }
        if errors.clear_repeats < errors.confirm_repeats {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "clear_repeats must be >= confirm_repeats",
            )));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };
        let epoch = clock.now();

        let (edge_capture, tap) = capture::capture_pair(clock.clone(), epoch);
        let supervisor = Supervisor::new(
            tap,
            sink,
            FilterBank::new(filters),
            ErrorChannel::new(errors),
            bus,
            timing,
            clock,
            epoch,
        );

        Ok((Sniffer { supervisor }, edge_capture))
    }
}
