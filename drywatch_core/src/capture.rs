//! Frame capture shared between the edge-reaction domain and the polling loop.
//!
//! The two domains communicate through one fixed [`BusShared`] block of
//! atomics. [`EdgeCapture`] is the edge-reaction side: not `Clone`, `&mut self`
//! methods, so there is exactly one writer for the bit-assembly state and the
//! buffer. [`FrameTap`] is the polling side: it only claims completed frames
//! (by compare-exchange on the status word) and snapshots the buffer before
//! decoding, so a start condition arriving mid-decode can never corrupt a
//! frame that is already being processed, and is itself never lost.
//!
//! Buffer bytes are stored `Relaxed` and published by a `Release` store of the
//! byte count / status word; the reader pairs those with `Acquire` loads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use drywatch_traits::{Clock, Level};

/// Fixed capture-buffer capacity in bytes. Longer frames are capped, not grown.
pub const FRAME_CAPACITY: usize = 32;

/// Capture status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameStatus {
    /// Idle, awaiting a start condition.
    Ready = 0,
    /// Bits are being accumulated.
    Receiving = 1,
    /// A stop condition was observed (or a timeout forced completion).
    Stop = 2,
    /// The polling side owns the frame for decoding.
    Busy = 3,
}

impl FrameStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => FrameStatus::Receiving,
            2 => FrameStatus::Stop,
            3 => FrameStatus::Busy,
            _ => FrameStatus::Ready,
        }
    }
}

struct BusShared {
    status: AtomicU8,
    bytes: [AtomicU8; FRAME_CAPACITY],
    byte_count: AtomicU8,
    last_edge_us: AtomicU64,
    dropped_bytes: AtomicU32,
}

impl BusShared {
    fn new() -> Self {
        Self {
            status: AtomicU8::new(FrameStatus::Ready as u8),
            bytes: [const { AtomicU8::new(0) }; FRAME_CAPACITY],
            byte_count: AtomicU8::new(0),
            last_edge_us: AtomicU64::new(0),
            dropped_bytes: AtomicU32::new(0),
        }
    }
}

/// Create the linked pair of capture handles over a fresh shared block.
pub fn capture_pair(
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
) -> (EdgeCapture, FrameTap) {
    let shared = Arc::new(BusShared::new());
    (
        EdgeCapture {
            shared: shared.clone(),
            clock,
            epoch,
            bit_num: 0,
            byte_tmp: 0,
            wait_ack: false,
        },
        FrameTap { shared },
    )
}

/// Edge-reaction side of the capture.
///
/// Both methods run in bounded time with no allocation, no locks and no
/// unbounded loops; the caller must invoke them from a single thread of
/// execution (interrupt delivery, or the [`crate::pump::EdgePump`] thread).
pub struct EdgeCapture {
    shared: Arc<BusShared>,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    // Bit/byte assembly state; touched only from this side.
    bit_num: u8,
    byte_tmp: u8,
    wait_ack: bool,
}

impl EdgeCapture {
    /// React to the clock line's data-valid (rising) transition.
    ///
    /// Outside `Receiving` the edge is a resynchronization signal only. While
    /// receiving, the sampled data level is shifted in MSB-first; after every
    /// assembled byte one edge is consumed as the acknowledgement slot and
    /// discarded.
    pub fn on_clock_rise(&mut self, sda: Level) {
        let now = self.clock.us_since(self.epoch);

        if self.shared.status.load(Ordering::Acquire) != FrameStatus::Receiving as u8 {
            self.shared.last_edge_us.store(now, Ordering::Relaxed);
            return;
        }

        if self.wait_ack {
            // Acknowledgement slot: consume and discard.
            self.wait_ack = false;
        } else {
            self.byte_tmp = (self.byte_tmp << 1) | sda.bit();
            self.bit_num += 1;
            if self.bit_num == 8 {
                let n = self.shared.byte_count.load(Ordering::Relaxed);
                if usize::from(n) < FRAME_CAPACITY {
                    self.shared.bytes[usize::from(n)].store(self.byte_tmp, Ordering::Relaxed);
                    self.shared.byte_count.store(n + 1, Ordering::Release);
                } else {
                    // Overlong frame: cap the buffer, count the excess.
                    self.shared.dropped_bytes.fetch_add(1, Ordering::Relaxed);
                }
                self.byte_tmp = 0;
                self.bit_num = 0;
                self.wait_ack = true;
            }
        }

        self.shared.last_edge_us.store(now, Ordering::Relaxed);
    }

    /// React to either transition of the data line.
    ///
    /// With the clock held high, a falling data line is a start condition and
    /// a rising one is a stop condition. A start condition takes priority over
    /// any in-progress frame, including one currently being decoded.
    pub fn on_data_edge(&mut self, scl: Level, sda: Level) {
        if scl.is_high() {
            if sda.is_low() {
                // Start condition: reset assembly state and restart capture.
                self.bit_num = 0;
                self.byte_tmp = 0;
                self.wait_ack = false;
                self.shared.byte_count.store(0, Ordering::Relaxed);
                self.shared
                    .status
                    .store(FrameStatus::Receiving as u8, Ordering::Release);
            } else {
                let status = self.shared.status.load(Ordering::Acquire);
                if status == FrameStatus::Receiving as u8 || status == FrameStatus::Busy as u8 {
                    self.shared
                        .status
                        .store(FrameStatus::Stop as u8, Ordering::Release);
                }
            }
        }
        self.shared
            .last_edge_us
            .store(self.clock.us_since(self.epoch), Ordering::Relaxed);
    }
}

/// One completed frame, snapshotted out of the shared buffer.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    bytes: [u8; FRAME_CAPACITY],
    len: usize,
}

impl Frame {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Polling side of the capture.
pub struct FrameTap {
    shared: Arc<BusShared>,
}

impl FrameTap {
    pub fn status(&self) -> FrameStatus {
        FrameStatus::from_u8(self.shared.status.load(Ordering::Acquire))
    }

    /// Timestamp of the most recent edge, in microseconds since the epoch.
    pub fn last_edge_us(&self) -> u64 {
        self.shared.last_edge_us.load(Ordering::Relaxed)
    }

    pub fn byte_count(&self) -> u8 {
        self.shared.byte_count.load(Ordering::Acquire)
    }

    /// Bytes dropped because a frame overran the buffer capacity.
    pub fn dropped_bytes(&self) -> u32 {
        self.shared.dropped_bytes.load(Ordering::Relaxed)
    }

    /// Reclaim a frame whose stop condition was missed.
    ///
    /// Promotes `Receiving` to `Stop` when data was captured (returning true),
    /// or back to `Ready` when the line went quiet before any byte landed.
    /// Compare-exchange keeps a concurrent start condition intact.
    pub fn force_complete(&self) -> bool {
        if self.byte_count() > 0 {
            self.shared
                .status
                .compare_exchange(
                    FrameStatus::Receiving as u8,
                    FrameStatus::Stop as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
        } else {
            let _ = self.shared.status.compare_exchange(
                FrameStatus::Receiving as u8,
                FrameStatus::Ready as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
            false
        }
    }

    /// Take ownership of a completed frame (`Stop` -> `Busy`) and snapshot it.
    ///
    /// The snapshot guards the decode against a start condition overwriting
    /// the shared buffer mid-read.
    pub fn claim(&self) -> Option<Frame> {
        self.shared
            .status
            .compare_exchange(
                FrameStatus::Stop as u8,
                FrameStatus::Busy as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()?;

        let len = usize::from(self.shared.byte_count.load(Ordering::Acquire)).min(FRAME_CAPACITY);
        let mut bytes = [0u8; FRAME_CAPACITY];
        for (dst, src) in bytes[..len].iter_mut().zip(&self.shared.bytes[..len]) {
            *dst = src.load(Ordering::Relaxed);
        }
        Some(Frame { bytes, len })
    }

    /// Return the capture to `Ready` after decoding (`Busy` -> `Ready`).
    ///
    /// A start or stop condition that raced in during the decode wins the
    /// exchange and is preserved rather than clobbered.
    pub fn release(&self) {
        let _ = self.shared.status.compare_exchange(
            FrameStatus::Busy as u8,
            FrameStatus::Ready as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
