//! Single-slot rendezvous between a reply callback and the waiting
//! measurement thread.
//!
//! The probe loop keeps at most one request in flight, so the channel
//! holds exactly one value: the sequence number observed in the reply.
//! The callback deposits and returns immediately; the measurement thread
//! takes the value and proceeds. There is deliberately no pending-request
//! table: any reply on the watched channel is treated as the answer to
//! the most recent probe, and a mismatched sequence number is reported
//! verbatim rather than discarded.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Thread-safe single-slot handoff of a reply sequence number.
#[derive(Debug, Default)]
pub struct RendezvousChannel {
    slot: Mutex<Option<u64>>,
    cond: Condvar,
}

impl RendezvousChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback side: deposit the observed sequence number and wake the
    /// waiter. Never blocks.
    ///
    /// A second deposit before the waiter ran overwrites the slot; with a
    /// single probe outstanding that only happens when the backend
    /// duplicated a reply, and the latest observation wins.
    pub fn deposit(&self, seq: u64) {
        let mut slot = self.slot.lock();
        *slot = Some(seq);
        self.cond.notify_one();
    }

    /// Measurement side: block until a reply was deposited, take it.
    ///
    /// A deposit that lands before the waiter blocks is not lost; the slot
    /// is checked under the lock before waiting.
    pub fn wait(&self) -> u64 {
        let mut slot = self.slot.lock();
        loop {
            if let Some(seq) = slot.take() {
                return seq;
            }
            self.cond.wait(&mut slot);
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    ///
    /// Returns `None` on expiry; the slot stays empty so a late reply to
    /// the abandoned probe is handed to the next wait instead.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<u64> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        loop {
            if let Some(seq) = slot.take() {
                return Some(seq);
            }
            if self.cond.wait_until(&mut slot, deadline).timed_out() {
                return slot.take();
            }
        }
    }
}
