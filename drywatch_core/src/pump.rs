//! Edge-pump thread bridging an [`EdgeSource`] to the capture handle.
//!
//! Spawns a thread that owns both the source and the interrupt-side capture
//! handle and dispatches edges as they arrive. Running both edge reactions on
//! one thread provides the serialization the capture state machine relies on
//! when there is no true interrupt controller underneath.
//!
//! Safety: each `EdgePump` spawns exactly one thread that is automatically
//! shut down when the `EdgePump` is dropped, preventing thread leaks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use drywatch_traits::{BusLine, EdgeSource};

use crate::capture::EdgeCapture;

pub struct EdgePump {
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl EdgePump {
    /// Spawn the pump thread. `poll_timeout` bounds how long one
    /// `next_edge` call may block, which also bounds shutdown latency.
    pub fn spawn<S: EdgeSource + Send + 'static>(
        mut source: S,
        mut capture: EdgeCapture,
        poll_timeout: Duration,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            loop {
                // Immediate shutdown check (lock-free atomic)
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("edge pump received shutdown signal");
                    break;
                }

                match source.next_edge(poll_timeout) {
                    Ok(Some(edge)) => match edge.line {
                        BusLine::Clock => capture.on_clock_rise(edge.sda),
                        BusLine::Data => capture.on_data_edge(edge.scl, edge.sda),
                    },
                    Ok(None) => {
                        // Timeout; loop around to re-check the shutdown flag.
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "edge source error");
                        // Back off so a persistently failing source cannot
                        // turn this loop into a busy spin.
                        std::thread::sleep(poll_timeout);
                    }
                }
            }
            tracing::trace!("edge pump thread exiting cleanly");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for EdgePump {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits either immediately (between edges) or after the
        // current next_edge call returns, bounded by poll_timeout.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("edge pump thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "edge pump thread panicked during shutdown");
                }
            }
        }
    }
}
