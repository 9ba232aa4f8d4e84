//! Bumper microswitches
//!
//! Two switches on the front bumper and two on the back. They are wired with
//! pull-ups, so a pressed switch reads `false`. A bumper counts as pressed
//! only when both of its switches are, i.e. the robot is square against the
//! wall.

use crate::robot::Robot;
use crate::system::error::{Operation, Result};
use crate::system::io::RobotIo;
use crate::system::poll::{pace, Deadline};
use crate::system::resources::SwitchSide;
use crate::system::state::MotionPhase;

impl<IO: RobotIo> Robot<'_, IO> {
    /// Whether both switches of the bumper are pressed
    pub fn switches_pressed(&mut self, side: SwitchSide) -> bool {
        let (left, right) = side.switches();
        // both inputs are sampled on every call
        let left_open = self.io.read_digital(left);
        let right_open = self.io.read_digital(right);
        !left_open && !right_open
    }

    /// [`Self::switches_pressed`] with a numeric side, 0 = front, 1 = back
    ///
    /// An unknown side reports "not pressed".
    pub fn switches_pressed_by_code(&mut self, code: u8) -> bool {
        match SwitchSide::from_code(code) {
            Some(side) => self.switches_pressed(side),
            None => {
                warn!("no microswitch side {}", code);
                false
            }
        }
    }

    /// Drives straight at `speed` until the bumper is square against
    /// something, then stops
    ///
    /// Use a negative speed to back into a wall with the rear bumper.
    pub fn drive_until_contact(&mut self, side: SwitchSide, speed: f32) -> Result<()> {
        info!("driving at {}% until {:?} contact", speed, side);
        let deadline = Deadline::start(&mut self.io, Operation::DriveToContact, self.config.motion.timeout());
        self.phase.set(MotionPhase::Moving);
        self.io.drive(speed, speed);

        let outcome = loop {
            if self.switches_pressed(side) {
                info!("{:?} contact", side);
                break Ok(());
            }
            if let Err(e) = deadline.check(&mut self.io, self.cancel) {
                break Err(e);
            }
            pace(&mut self.io, self.config.motion.poll);
        };

        self.io.stop_both();
        self.phase.set(MotionPhase::Idle);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::cancel::CancelToken;
    use crate::system::config::RobotConfig;
    use crate::system::error::Error;
    use crate::system::resources::{DigitalInput, Side};
    use crate::testing::SimIo;

    fn robot(io: SimIo, cancel: &CancelToken) -> Robot<'_, SimIo> {
        Robot::new(io, RobotConfig::default(), cancel).unwrap()
    }

    #[test]
    fn pressed_only_when_both_read_low() {
        let cancel = CancelToken::new();
        let io = SimIo::new()
            .with_digital_sequence(DigitalInput::FrontLeftSwitch, &[true, false, true, false])
            .with_digital_sequence(DigitalInput::FrontRightSwitch, &[true, true, false, false]);
        let mut robot = robot(io, &cancel);

        let samples: Vec<bool> = (0..4).map(|_| robot.switches_pressed(SwitchSide::Front)).collect();
        assert_eq!(samples, vec![false, false, false, true]);
    }

    #[test]
    fn sides_read_their_own_switches() {
        let cancel = CancelToken::new();
        let io = SimIo::new()
            .with_digital_sequence(DigitalInput::BackLeftSwitch, &[false])
            .with_digital_sequence(DigitalInput::BackRightSwitch, &[false]);
        let mut robot = robot(io, &cancel);

        assert!(robot.switches_pressed(SwitchSide::Back));
        assert!(!robot.switches_pressed(SwitchSide::Front));
        assert!(robot.switches_pressed_by_code(1));
        assert!(!robot.switches_pressed_by_code(0));
    }

    #[test]
    fn unknown_side_is_not_pressed() {
        let cancel = CancelToken::new();
        let io = SimIo::new()
            .with_digital_sequence(DigitalInput::FrontLeftSwitch, &[false])
            .with_digital_sequence(DigitalInput::FrontRightSwitch, &[false]);
        let mut robot = robot(io, &cancel);

        assert!(!robot.switches_pressed_by_code(2));
    }

    #[test]
    fn drives_into_the_wall_and_stops() {
        let cancel = CancelToken::new();
        let io = SimIo::new()
            .with_digital_sequence(DigitalInput::FrontLeftSwitch, &[true, false, false])
            .with_digital_sequence(DigitalInput::FrontRightSwitch, &[true, true, false]);
        let mut robot = robot(io, &cancel);

        robot.drive_until_contact(SwitchSide::Front, 50.0).unwrap();

        let io = robot.io_mut();
        assert_eq!(io.drive_pairs(), vec![(0.0, 0.0), (50.0, 50.0), (0.0, 0.0)]);
        // three samples of two switches
        assert_eq!(io.elapsed().as_millis(), 6);
        assert_eq!(robot.motion_phase(), MotionPhase::Idle);
    }

    #[test]
    fn missing_wall_times_out() {
        let cancel = CancelToken::new();
        let mut config = RobotConfig::default();
        config.motion.timeout_ms = Some(300);
        let mut robot = Robot::new(SimIo::new(), config, &cancel).unwrap();

        let result = robot.drive_until_contact(SwitchSide::Back, -50.0);

        assert!(matches!(
            result,
            Err(Error::Timeout {
                operation: Operation::DriveToContact,
                ..
            })
        ));
        assert_eq!(robot.io_mut().motor(Side::Left), 0.0);
        assert_eq!(robot.io_mut().moving_pairs(), vec![(-50.0, -50.0)]);
    }
}
