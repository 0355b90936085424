/// Dyno Error Types
///
/// Error handling for benchmark setup. Steady-state failures (a rejected
/// send, an unanswered probe) are not errors at this level; drivers log
/// them and keep looping.
use thiserror::Error;

/// Main error type for dyno setup operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynoError {
    /// The backend reported a failed connect handshake.
    #[error("connect failed, rc {0}")]
    ConnectFailed(i32),

    /// The backend reported a failed subscribe acknowledgment.
    #[error("subscribe failed, rc {0}")]
    SubscribeFailed(i32),
}

/// Result type alias for dyno operations.
pub type Result<T> = std::result::Result<T, DynoError>;

impl DynoError {
    /// Backend-supplied reason code, when one was reported.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::ConnectFailed(rc) | Self::SubscribeFailed(rc) => *rc,
        }
    }
}
