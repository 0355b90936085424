//! Correlated probe payloads and the latency probe loop.
//!
//! One round trip is measured per iteration: build a payload carrying the
//! current sequence number, submit it, block on the rendezvous until the
//! responder's echo is observed, and report the elapsed time. Exactly one
//! probe is in flight at a time.

use crate::rendezvous::RendezvousChannel;
use crate::shutdown::ShutdownToken;
use bytes::{Bytes, BytesMut};
use std::time::{Duration, Instant};
use tracing::warn;

/// Leading bytes of a probe payload holding the sequence number.
pub const SEQ_BYTES: usize = 8;

/// Elapsed value emitted when a rendezvous timeout expired.
pub const TIMED_OUT: i64 = -1;

/// Build a probe payload of `size` bytes with `seq` encoded little-endian
/// in the first eight; the rest is zero padding.
///
/// Sizes below eight are rounded up so the correlation id always fits.
#[must_use]
pub fn probe_payload(seq: u64, size: usize) -> Bytes {
    let mut buf = BytesMut::zeroed(size.max(SEQ_BYTES));
    buf[..SEQ_BYTES].copy_from_slice(&seq.to_le_bytes());
    buf.freeze()
}

/// Recover the sequence number from the first eight bytes of a payload.
///
/// Returns `None` for payloads too short to carry one.
#[must_use]
pub fn read_seq(payload: &[u8]) -> Option<u64> {
    let bytes: [u8; SEQ_BYTES] = payload.get(..SEQ_BYTES)?.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}

/// Probe loop parameters.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Inter-probe sleep. Zero is legal and yields a tight loop.
    pub interval: Duration,
    /// Payload size in bytes (rounded up to [`SEQ_BYTES`]).
    pub payload_size: usize,
    /// Optional rendezvous timeout. With `None`, an unanswered probe
    /// blocks forever.
    pub timeout: Option<Duration>,
}

/// Run the latency probe loop until the shutdown token is triggered.
///
/// `send` submits one payload to the backend; a submission failure skips
/// timing for that iteration and the sequence number is abandoned, never
/// retried. On success the loop blocks on `rendezvous` for the echo and
/// then calls `emit(observed_seq, elapsed_us)`. The observed sequence is
/// passed through verbatim even when it differs from the one sent, so a
/// reordering or duplicating backend is detectable downstream. When a
/// configured timeout expires, `emit` receives the sent sequence with
/// [`TIMED_OUT`] as the elapsed value.
pub fn run_probe_loop<E>(
    config: &ProbeConfig,
    rendezvous: &RendezvousChannel,
    shutdown: &ShutdownToken,
    mut send: impl FnMut(&[u8]) -> Result<(), E>,
    mut emit: impl FnMut(u64, i64),
) where
    E: std::fmt::Display,
{
    let mut seq = 0u64;
    while !shutdown.is_triggered() {
        if !config.interval.is_zero() {
            std::thread::sleep(config.interval);
        }

        let payload = probe_payload(seq, config.payload_size);
        let start = Instant::now();
        match send(&payload) {
            Ok(()) => match config.timeout {
                None => {
                    let observed = rendezvous.wait();
                    let elapsed = start.elapsed().as_micros() as i64;
                    emit(observed, elapsed);
                }
                Some(timeout) => match rendezvous.wait_timeout(timeout) {
                    Some(observed) => {
                        let elapsed = start.elapsed().as_micros() as i64;
                        emit(observed, elapsed);
                    }
                    None => emit(seq, TIMED_OUT),
                },
            },
            // Transient failure: no timing for this iteration, next
            // iteration uses a fresh sequence number.
            Err(e) => warn!(seq, error = %e, "probe send rejected"),
        }
        seq += 1;
    }
}
