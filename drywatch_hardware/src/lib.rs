//! Edge sources: a simulated dryer bus, and real GPIO pins behind the
//! `hardware` feature.

pub mod error;
#[cfg(feature = "hardware")]
pub mod gpio;

use std::collections::VecDeque;
use std::time::Duration;

use crossbeam_channel as xch;
use drywatch_traits::{BusLine, EdgeEvent, EdgeSource, Level};

#[cfg(feature = "hardware")]
pub use gpio::GpioProbe;

/// Handle for pushing frames onto a [`SimulatedDryer`] bus.
#[derive(Debug, Clone)]
pub struct FrameInjector {
    tx: xch::Sender<Vec<u8>>,
}

impl FrameInjector {
    /// Queue one frame for replay. Returns false when the bus side is gone.
    pub fn inject(&self, frame: &[u8]) -> bool {
        self.tx.send(frame.to_vec()).is_ok()
    }
}

/// Simulated display bus: replays injected frames as the exact edge sequence
/// a real capture would observe (start condition, eight data-valid clock
/// edges per byte plus one acknowledgement edge, stop condition).
///
/// `frame_gap` reproduces the idle time between frames on the real bus; the
/// polling loop needs that window to claim one frame before the next start
/// condition resets the capture.
#[derive(Debug)]
pub struct SimulatedDryer {
    rx: xch::Receiver<Vec<u8>>,
    pending: VecDeque<EdgeEvent>,
    frame_gap: Duration,
}

/// Create a linked injector/bus pair with a bounded frame queue.
pub fn simulated_pair(queue_depth: usize, frame_gap: Duration) -> (FrameInjector, SimulatedDryer) {
    let (tx, rx) = xch::bounded(queue_depth.max(1));
    (
        FrameInjector { tx },
        SimulatedDryer {
            rx,
            pending: VecDeque::new(),
            frame_gap,
        },
    )
}

fn frame_edges(bytes: &[u8]) -> VecDeque<EdgeEvent> {
    // start + (8 bits + ack) per byte + stop
    let mut edges = VecDeque::with_capacity(2 + bytes.len() * 9);
    edges.push_back(EdgeEvent {
        line: BusLine::Data,
        scl: Level::High,
        sda: Level::Low,
    });
    for &byte in bytes {
        for bit in (0..8).rev() {
            edges.push_back(EdgeEvent {
                line: BusLine::Clock,
                scl: Level::High,
                sda: Level::from((byte >> bit) & 1 == 1),
            });
        }
        // Acknowledgement slot; the level is irrelevant, the capture discards it.
        edges.push_back(EdgeEvent {
            line: BusLine::Clock,
            scl: Level::High,
            sda: Level::Low,
        });
    }
    edges.push_back(EdgeEvent {
        line: BusLine::Data,
        scl: Level::High,
        sda: Level::High,
    });
    edges
}

impl EdgeSource for SimulatedDryer {
    fn next_edge(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<Option<EdgeEvent>, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(edge) = self.pending.pop_front() {
            return Ok(Some(edge));
        }
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => {
                if !self.frame_gap.is_zero() {
                    std::thread::sleep(self.frame_gap);
                }
                tracing::trace!(len = frame.len(), "replaying injected frame");
                self.pending = frame_edges(&frame);
                Ok(self.pending.pop_front())
            }
            Err(xch::RecvTimeoutError::Timeout) => Ok(None),
            Err(xch::RecvTimeoutError::Disconnected) => {
                // Injector dropped; the bus is simply idle from here on.
                Ok(None)
            }
        }
    }
}
