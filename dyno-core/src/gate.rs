//! Connection gate: bridges an async connect/subscribe handshake to a
//! blocking "wait until ready" primitive.
//!
//! Client libraries report connect and subscribe outcomes from their own
//! I/O thread. The measurement thread must not publish or probe before the
//! handshake completed, so it parks on the gate instead of busy-polling a
//! flag. Each callback-side transition is one atomic hand-off: lock,
//! update, notify, return.

use crate::error::{DynoError, Result};
use parking_lot::{Condvar, Mutex};
use tracing::trace;

/// Handshake progress.
///
/// `Failed` is terminal; there is no recovery transition. A benchmark run
/// with no live broker is not a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Subscribing,
    Subscribed,
    Failed(FailurePhase, i32),
}

/// Which handshake step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePhase {
    Connect,
    Subscribe,
}

/// Blocking gate shared between the backend callback thread and the
/// measurement thread.
#[derive(Debug, Default)]
pub struct ConnectionGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl ConnectionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> GateState {
        *self.state.lock()
    }

    /// Mark the connect request as submitted.
    pub fn connecting(&self) {
        self.transition(GateState::Disconnected, GateState::Connecting);
    }

    /// Callback side: the backend confirmed the connection.
    pub fn connect_succeeded(&self) {
        self.transition(GateState::Connecting, GateState::Connected);
    }

    /// Callback side: the connect handshake failed with a reason code.
    pub fn connect_failed(&self, code: i32) {
        self.fail(FailurePhase::Connect, code);
    }

    /// Mark the subscribe request as submitted.
    pub fn subscribing(&self) {
        self.transition(GateState::Connected, GateState::Subscribing);
    }

    /// Callback side: the backend acknowledged the subscription.
    pub fn subscribe_succeeded(&self) {
        self.transition(GateState::Subscribing, GateState::Subscribed);
    }

    /// Callback side: the subscribe request failed with a reason code.
    pub fn subscribe_failed(&self, code: i32) {
        self.fail(FailurePhase::Subscribe, code);
    }

    /// Block the calling thread until the backend reports connect success.
    ///
    /// Returns an error once the gate entered `Failed`; callers terminate
    /// the process on that.
    pub fn await_connected(&self) -> Result<()> {
        let mut state = self.state.lock();
        loop {
            match *state {
                GateState::Connected | GateState::Subscribing | GateState::Subscribed => {
                    return Ok(())
                }
                GateState::Failed(phase, code) => return Err(failure(phase, code)),
                _ => self.cond.wait(&mut state),
            }
        }
    }

    /// Block the calling thread until the subscribe acknowledgment arrived.
    ///
    /// Only meaningful after [`await_connected`](Self::await_connected)
    /// returned Ok.
    pub fn await_subscribed(&self) -> Result<()> {
        let mut state = self.state.lock();
        loop {
            match *state {
                GateState::Subscribed => return Ok(()),
                GateState::Failed(phase, code) => return Err(failure(phase, code)),
                _ => self.cond.wait(&mut state),
            }
        }
    }

    fn transition(&self, from: GateState, to: GateState) {
        let mut state = self.state.lock();
        if *state == from {
            trace!(?from, ?to, "gate transition");
            *state = to;
            self.cond.notify_all();
        } else {
            trace!(current = ?*state, ?to, "ignoring out-of-order gate transition");
        }
    }

    fn fail(&self, phase: FailurePhase, code: i32) {
        let mut state = self.state.lock();
        // Failed is terminal; the first failure wins.
        if !matches!(*state, GateState::Failed(..)) {
            *state = GateState::Failed(phase, code);
            self.cond.notify_all();
        }
    }
}

const fn failure(phase: FailurePhase, code: i32) -> DynoError {
    match phase {
        FailurePhase::Connect => DynoError::ConnectFailed(code),
        FailurePhase::Subscribe => DynoError::SubscribeFailed(code),
    }
}
