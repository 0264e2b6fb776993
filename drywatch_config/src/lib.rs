#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and validation for the dryer bus monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every threshold defaults to the values observed on the real device, so
//!   an empty config file is a working config.
use serde::Deserialize;

/// Which two GPIO lines to monitor, and whether to enable the internal
/// pull-up resistors on them. Consumed by the host glue, not the core.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Pins {
    pub scl: u8,
    pub sda: u8,
    pub pullup: bool,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            scl: 22,
            sda: 21,
            pullup: false,
        }
    }
}

/// Bus-level protocol parameters.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Bus {
    /// Expected leading address byte of a valid frame.
    pub address: u8,
    /// Force-complete a frame when no edge arrives for this long (us).
    pub bit_timeout_us: u64,
    /// Declare the device absent when no valid frame arrives for this long (ms).
    pub absence_timeout_ms: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Self {
            address: 0x7E,
            bit_timeout_us: 200,
            absence_timeout_ms: 3000,
        }
    }
}

/// Per-channel debounce thresholds and range limits.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Filters {
    pub set_temp_repeats: u8,
    pub process_temp_repeats: u8,
    /// Escalated threshold for a process-temperature step change (> max_step_c).
    pub process_jump_repeats: u8,
    pub humidity_repeats: u8,
    pub time_repeats: u8,
    pub material_repeats: u8,
    pub cursor_repeats: u8,
    /// Temperatures above this are rejected as noise (degrees).
    pub max_temp_c: u8,
    /// Largest accepted step between consecutive published temperatures (degrees).
    pub max_step_c: u8,
    /// Largest accepted hours field of the drying-time display.
    pub max_hours: u8,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            set_temp_repeats: 5,
            process_temp_repeats: 5,
            process_jump_repeats: 10,
            humidity_repeats: 3,
            time_repeats: 2,
            material_repeats: 10,
            cursor_repeats: 3,
            max_temp_c: 80,
            max_step_c: 5,
            max_hours: 48,
        }
    }
}

/// Error-code hysteresis: confirming is fast, clearing is deliberately slow.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Errors {
    pub confirm_repeats: u8,
    pub clear_repeats: u8,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            confirm_repeats: 3,
            clear_repeats: 10,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Advisory diagnostics; never load-bearing for correctness.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Diagnostics {
    /// Collect valid/invalid frame counters.
    pub statistics: bool,
    /// Interval between periodic decoded-value debug logs (ms).
    pub log_interval_ms: u64,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            statistics: true,
            log_interval_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub bus: Bus,
    pub filters: Filters,
    pub errors: Errors,
    pub logging: Logging,
    pub diagnostics: Diagnostics,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_path(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        if self.pins.scl == self.pins.sda {
            eyre::bail!("pins.scl and pins.sda must differ");
        }

        // Bus
        if self.bus.bit_timeout_us == 0 {
            eyre::bail!("bus.bit_timeout_us must be >= 1");
        }
        if self.bus.absence_timeout_ms == 0 {
            eyre::bail!("bus.absence_timeout_ms must be >= 1");
        }
        if self.bus.absence_timeout_ms > 60 * 60 * 1000 {
            eyre::bail!("bus.absence_timeout_ms is unreasonably large (>1h)");
        }

        // Filters
        if self.filters.set_temp_repeats == 0
            || self.filters.process_temp_repeats == 0
            || self.filters.humidity_repeats == 0
            || self.filters.time_repeats == 0
            || self.filters.material_repeats == 0
            || self.filters.cursor_repeats == 0
        {
            eyre::bail!("every filters.*_repeats threshold must be >= 1");
        }
        if self.filters.process_jump_repeats < self.filters.process_temp_repeats {
            eyre::bail!("filters.process_jump_repeats must be >= filters.process_temp_repeats");
        }
        if self.filters.max_temp_c == 0 {
            eyre::bail!("filters.max_temp_c must be >= 1");
        }
        if self.filters.max_step_c == 0 {
            eyre::bail!("filters.max_step_c must be >= 1");
        }
        if self.filters.max_hours == 0 || self.filters.max_hours > 99 {
            eyre::bail!("filters.max_hours must be in [1, 99]");
        }

        // Errors: clearing must not be faster than confirming, or codes flicker
        if self.errors.confirm_repeats == 0 {
            eyre::bail!("errors.confirm_repeats must be >= 1");
        }
        if self.errors.clear_repeats < self.errors.confirm_repeats {
            eyre::bail!("errors.clear_repeats must be >= errors.confirm_repeats");
        }

        // Diagnostics
        if self.diagnostics.log_interval_ms == 0 {
            eyre::bail!("diagnostics.log_interval_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
