//! Course robot core
//!
//! Motion and sensing primitives for a two-wheel differential robot running a
//! fixed competition course:
//! - Encoder dead reckoning for straight moves and in-place pivots
//! - CdS light classification (start signal and target colour)
//! - Three-sensor line following with a lost-line search
//! - Scripted course routines built on the primitives above
//!
//! Hardware is reached only through the [`RobotIo`] capability, so the same
//! code runs on the RP2350 firmware and against the simulated robot used by
//! the host tests.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

/// Drive facade the run script talks to
pub mod robot;
/// Shared types: hardware capability, configuration, errors, cancellation
pub mod system;
/// Behaviours built on the hardware capability
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use robot::Robot;
pub use system::cancel::CancelToken;
pub use system::config::RobotConfig;
pub use system::error::{ConfigError, Error, Operation, Result};
pub use system::io::RobotIo;
pub use system::resources::{AnalogInput, DigitalInput, ServoChannel, Side, SwitchSide};
pub use task::color::Color;
pub use task::drive::MoveReport;
pub use task::line_follow::{LineState, Termination};
