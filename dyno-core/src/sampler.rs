//! Throughput sampling: a lock-free counter drained once per interval.
//!
//! Producer threads record one unit per confirmed operation with an atomic
//! fetch-add; a single reporter thread periodically exchanges the counter
//! to zero and emits the drained value as a messages/second rate. The
//! counter is the only synchronization point between producers; it
//! guarantees exact counting, not event ordering.

use crate::shutdown::ShutdownToken;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

/// Shared operation counter.
///
/// Word-aligned `AtomicU64`; plain load/store pairs would lose updates
/// under concurrent increments.
#[derive(Debug, Default)]
pub struct ThroughputCounter(AtomicU64);

impl ThroughputCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Count one confirmed operation.
    pub fn record(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Atomically read and reset the counter, returning the prior value.
    ///
    /// The drained value is the exact number of operations recorded since
    /// the previous drain.
    pub fn drain(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// When the reporter emits a drained value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Emit every interval, zero included (send-count publish side).
    Always,
    /// Emit only when the drained value is greater than zero (receive side).
    NonZero,
}

/// Periodic reporter thread draining a [`ThroughputCounter`].
pub struct Reporter;

impl Reporter {
    /// Spawn the reporter. It wakes once per `interval`, drains the
    /// counter, and hands the value to `emit` according to `mode`, until
    /// the shutdown token is triggered.
    pub fn spawn<F>(
        counter: Arc<ThroughputCounter>,
        interval: Duration,
        mode: ReportMode,
        shutdown: ShutdownToken,
        mut emit: F,
    ) -> JoinHandle<()>
    where
        F: FnMut(u64) + Send + 'static,
    {
        thread::spawn(move || {
            while !shutdown.is_triggered() {
                thread::sleep(interval);
                let n = counter.drain();
                if mode == ReportMode::Always || n > 0 {
                    emit(n);
                }
            }
        })
    }
}

/// Bounded "overhead" send loop: run until exactly
/// `total_volume / payload_size` sends were accepted.
///
/// A rejected send is logged and retried with the same message rather
/// than counted, so the accepted total always matches the target. Returns
/// the number of confirmed sends (short only if the shutdown token fired).
pub fn run_bounded<E>(
    total_volume: u64,
    payload_size: usize,
    counter: &ThroughputCounter,
    shutdown: &ShutdownToken,
    mut send: impl FnMut() -> Result<(), E>,
) -> u64
where
    E: std::fmt::Display,
{
    let target = total_volume / payload_size as u64;
    let mut accepted = 0u64;
    while accepted < target && !shutdown.is_triggered() {
        match send() {
            Ok(()) => {
                counter.record();
                accepted += 1;
            }
            Err(e) => warn!(error = %e, "send rejected, retrying"),
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_and_resets() {
        let counter = ThroughputCounter::new();
        counter.record();
        counter.record();
        assert_eq!(counter.drain(), 2);
        assert_eq!(counter.drain(), 0);
    }

    #[test]
    fn concurrent_increments_are_conserved() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: u64 = 100_000;

        let counter = Arc::new(ThroughputCounter::new());
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..PER_PRODUCER {
                        counter.record();
                    }
                })
            })
            .collect();

        // Drain concurrently with the producers; nothing may be lost or
        // double-counted across the drains.
        let mut drained = 0u64;
        for _ in 0..50 {
            drained += counter.drain();
            thread::yield_now();
        }
        for producer in producers {
            producer.join().unwrap();
        }
        drained += counter.drain();

        assert_eq!(drained, PRODUCERS as u64 * PER_PRODUCER);
    }

    #[test]
    fn bounded_run_retries_until_target() {
        let counter = ThroughputCounter::new();
        let shutdown = ShutdownToken::new();

        // Fail every third attempt; the retry must keep the accepted
        // count exact.
        let mut attempts = 0u64;
        let accepted = run_bounded(1024, 100, &counter, &shutdown, || {
            attempts += 1;
            if attempts % 3 == 0 {
                Err("backend busy")
            } else {
                Ok(())
            }
        });

        assert_eq!(accepted, 10); // 1024 / 100, truncating
        assert_eq!(counter.drain(), 10);
        assert!(attempts > 10);
    }

    #[test]
    fn bounded_run_stops_on_shutdown() {
        let counter = ThroughputCounter::new();
        let shutdown = ShutdownToken::new();
        shutdown.trigger();

        let accepted = run_bounded(1_000_000, 1, &counter, &shutdown, || Ok::<(), &str>(()));
        assert_eq!(accepted, 0);
    }

    #[test]
    fn reporter_nonzero_mode_skips_empty_intervals() {
        let counter = Arc::new(ThroughputCounter::new());
        let shutdown = ShutdownToken::new();
        let (tx, rx) = flume::unbounded();

        let handle = Reporter::spawn(
            Arc::clone(&counter),
            Duration::from_millis(10),
            ReportMode::NonZero,
            shutdown.clone(),
            move |n| tx.send(n).unwrap(),
        );

        thread::sleep(Duration::from_millis(50));
        shutdown.trigger();
        handle.join().unwrap();

        assert!(rx.try_iter().all(|n| n > 0));
    }

    #[test]
    fn reporter_always_mode_emits_zero_intervals() {
        let counter = Arc::new(ThroughputCounter::new());
        let shutdown = ShutdownToken::new();
        let (tx, rx) = flume::unbounded();

        let handle = Reporter::spawn(
            Arc::clone(&counter),
            Duration::from_millis(10),
            ReportMode::Always,
            shutdown.clone(),
            move |n| tx.send(n).unwrap(),
        );

        thread::sleep(Duration::from_millis(50));
        shutdown.trigger();
        handle.join().unwrap();

        let emitted: Vec<u64> = rx.try_iter().collect();
        assert!(!emitted.is_empty());
        assert!(emitted.iter().all(|&n| n == 0));
    }
}
