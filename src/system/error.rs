//! Error types
//!
//! Only two things ever surface to the run script as failures: a wait that
//! ran past its limit and a cooperative cancellation. Ambiguous sensor
//! readings are ordinary values (`Color::NoReading`, `LineState::OffLine`).

use thiserror::Error;

/// Operation that was running when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    LinearMove,
    Pivot,
    RollOn,
    DriveToContact,
    FollowLine,
    WaitForLight,
    ColorApproach,
}

/// Motion and sensing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The wait condition was not met in time (stalled wheel, dead sensor)
    #[error("{operation:?} timed out after {waited_ms} ms")]
    Timeout { operation: Operation, waited_ms: u64 },
    /// The cancellation token was raised
    #[error("{operation:?} was cancelled")]
    Cancelled { operation: Operation },
}

pub type Result<T> = core::result::Result<T, Error>;

/// Configuration rejected by [`crate::RobotConfig::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("wheel diameter must be positive")]
    WheelDiameter,
    #[error("wheel track must be positive")]
    WheelTrack,
    #[error("ticks per revolution must be positive")]
    TicksPerRev,
    #[error("color band edges must be positive and strictly increasing")]
    ColorBands,
    #[error("speed tiers must lie in [-100, 100]")]
    SpeedOutOfRange,
}
