use thiserror::Error;

/// Convenience result alias for clock operations.
pub type ClockResult<T> = Result<T, ClockError>;

/// Errors surfaced while starting a [`TickClock`](crate::TickClock).
///
/// A running clock never fails; it only stops.
#[derive(Debug, Error)]
pub enum ClockError {
    /// The requested interval was zero.
    #[error("tick interval must be non-zero")]
    ZeroInterval,

    /// The timer thread could not be created.
    #[error("failed to spawn clock thread: {0}")]
    Spawn(#[from] std::io::Error),
}
