//! Plain configuration structs for the core.
//!
//! The serde-facing TOML schema lives in `drywatch_config`; these are the
//! validated runtime forms, with defaults matching the values observed on the
//! real device.

/// Bus-level validation parameters.
#[derive(Debug, Clone, Copy)]
pub struct BusCfg {
    /// Expected leading address byte of a valid frame.
    pub address: u8,
}

impl Default for BusCfg {
    fn default() -> Self {
        Self { address: 0x7E }
    }
}

/// Timeouts and cadences of the polling loop.
#[derive(Debug, Clone, Copy)]
pub struct TimingCfg {
    /// Force-complete a receiving frame when no edge arrives for this long (us).
    pub bit_timeout_us: u64,
    /// Declare the device absent when no valid frame arrives for this long (ms).
    pub absence_timeout_ms: u64,
    /// Interval between periodic decoded-value debug logs (ms).
    pub log_interval_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            bit_timeout_us: 200,
            absence_timeout_ms: 3000,
            log_interval_ms: 30_000,
        }
    }
}

/// Per-channel debounce thresholds and range limits.
#[derive(Debug, Clone, Copy)]
pub struct FilterBankCfg {
    pub set_temp_repeats: u8,
    pub process_temp_repeats: u8,
    /// Escalated threshold applied to a process-temperature step change.
    pub process_jump_repeats: u8,
    pub humidity_repeats: u8,
    pub time_repeats: u8,
    pub material_repeats: u8,
    pub cursor_repeats: u8,
    /// Temperatures above this are rejected as noise (degrees).
    pub max_temp_c: u8,
    /// Largest accepted step between consecutive published temperatures.
    pub max_step_c: u8,
    /// Largest accepted hours field of the drying-time display.
    pub max_hours: u8,
}

impl Default for FilterBankCfg {
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

/// Error-channel hysteresis thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCfg {
    pub confirm_repeats: u8,
    pub clear_repeats: u8,
}

impl Default for ErrorCfg {
    fn default() -> Self {
        Self {
            confirm_repeats: 3,
            clear_repeats: 10,
        }
    }
}

impl From<&drywatch_config::Config> for BusCfg {
    fn from(cfg: &drywatch_config::Config) -> Self {
        Self {
            address: cfg.bus.address,
        }
    }
}

impl From<&drywatch_config::Config> for TimingCfg {
    fn from(cfg: &drywatch_config::Config) -> Self {
        Self {
            bit_timeout_us: cfg.bus.bit_timeout_us,
            absence_timeout_ms: cfg.bus.absence_timeout_ms,
            log_interval_ms: cfg.diagnostics.log_interval_ms,
        }
    }
}

impl From<&drywatch_config::Config> for FilterBankCfg {
    fn from(cfg: &drywatch_config::Config) -> Self {
        let f = &cfg.filters;
        Self {
            set_temp_repeats: f.set_temp_repeats,
            process_temp_repeats: f.process_temp_repeats,
            process_jump_repeats: f.process_jump_repeats,
            humidity_repeats: f.humidity_repeats,
            time_repeats: f.time_repeats,
            material_repeats: f.material_repeats,
            cursor_repeats: f.cursor_repeats,
            max_temp_c: f.max_temp_c,
            max_step_c: f.max_step_c,
            max_hours: f.max_hours,
        }
    }
}

impl From<&drywatch_config::Config> for ErrorCfg {
    fn from(cfg: &drywatch_config::Config) -> Self {
        Self {
            confirm_repeats: cfg.errors.confirm_repeats,
            clear_repeats: cfg.errors.clear_repeats,
        }
    }
}
