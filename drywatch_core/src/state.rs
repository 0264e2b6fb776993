//! Coarse device operational state, derived from the decoded stream.

use drywatch_traits::Sink;

/// Operational state of the observed device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// No valid frames for longer than the absence timeout.
    Absent,
    /// First valid frame seen after an absence; no confirmed activity yet.
    Starting,
    /// Powered and idle (confirmed drying time of zero).
    Idle,
    /// Actively drying (confirmed nonzero drying time).
    Active,
    /// A device error code is confirmed; takes priority over Idle/Active.
    Error,
}

impl DeviceState {
    /// Published status string, in the device's own vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceState::Absent => "Off",
            DeviceState::Starting => "Starting",
            DeviceState::Idle => "Idle",
            DeviceState::Active => "Drying",
            DeviceState::Error => "Error",
        }
    }
}

/// Tracks the device state and publishes the status channel on change.
#[derive(Debug)]
pub struct DeviceTracker {
    state: DeviceState,
}

impl Default for DeviceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTracker {
    pub fn new() -> Self {
        Self {
            state: DeviceState::Absent,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn set<K: Sink>(&mut self, next: DeviceState, sink: &mut K) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "device state change");
            self.state = next;
            sink.dryer_status(next.as_str());
        }
    }
}
