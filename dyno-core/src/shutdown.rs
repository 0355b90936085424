//! Cooperative cancellation flag.
//!
//! The driver binaries run until externally killed; every dyno loop
//! nevertheless checks a token at its head so tests and embedders can stop
//! it cleanly without changing steady-state behavior.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable shutdown flag shared across loop, reporter, and test threads.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether shutdown was requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
