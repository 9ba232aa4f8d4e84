//! Robot facade
//!
//! [`Robot`] bundles the hardware capability, the configuration and the
//! cancellation token. The operations themselves live with their behaviour
//! modules under [`crate::task`]:
//! - `move_linear`, `pivot`, `drive_to_ticks` in [`crate::task::drive`]
//! - `classify_color`, `wait_for_light`, `creep_until_color` in [`crate::task::color`]
//! - `follow_line` in [`crate::task::line_follow`]
//! - `find_line` in [`crate::task::line_search`]
//! - `switches_pressed`, `drive_until_contact` in [`crate::task::contact`]
//!
//! Every operation takes `&mut self`, so two operations can never drive the
//! motors at the same time.

use crate::system::cancel::CancelToken;
use crate::system::config::RobotConfig;
use crate::system::error::ConfigError;
use crate::system::io::RobotIo;
use crate::system::state::MotionPhase;

/// The robot as seen by the run script
pub struct Robot<'c, IO: RobotIo> {
    pub(crate) io: IO,
    pub(crate) config: RobotConfig,
    pub(crate) cancel: &'c CancelToken,
    pub(crate) phase: MotionPhase,
}

impl<'c, IO: RobotIo> Robot<'c, IO> {
    /// Takes ownership of the hardware after validating the configuration
    ///
    /// Both motors are stopped and both encoders zeroed before returning.
    pub fn new(mut io: IO, config: RobotConfig, cancel: &'c CancelToken) -> Result<Self, ConfigError> {
        config.validate()?;

        io.stop_both();
        io.reset_encoders();
        info!("robot ready, geometry {:?}", config.geometry);

        Ok(Self {
            io,
            config,
            cancel,
            phase: MotionPhase::Idle,
        })
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn motion_phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn cancel_token(&self) -> &'c CancelToken {
        self.cancel
    }

    /// Direct hardware access for attachments the core does not model
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Gives the hardware back, motors stopped
    pub fn into_io(mut self) -> IO {
        self.io.stop_both();
        self.io
    }
}
