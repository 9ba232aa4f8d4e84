//! Course routines
//!
//! Each routine scores one course task from a known starting pose and is a
//! fixed sequence of the motion and sensing primitives. Distances are in
//! inches and angles in degrees, measured on the competition course.
//!
//! # Routines
//! - [`Robot::wait_for_start`]: park the arm, wait for the red start light
//! - [`Robot::climb_ramp`]: up the ramp without throwing the tray
//! - [`Robot::tray`]: climb, then dump the tray into the sink
//! - [`Robot::burger`]: climb, then flip the burger plate
//! - [`Robot::ticket`]: slide the ticket with the servo arm
//! - [`Robot::jukebox`]: read the jukebox light and press the matching button

use crate::robot::Robot;
use crate::system::error::Result;
use crate::system::io::RobotIo;
use crate::system::resources::{ServoChannel, SwitchSide};
use crate::task::color::Color;

/// Arm angle while stowed
const ARM_STOWED: f32 = 0.0;
/// Arm angle while hooked into the ticket slot
const ARM_DEPLOYED: f32 = 100.0;

/// Fraction of the drive power for the ramp run-up
const RUN_UP: f32 = 0.65;
/// Multiple of the drive power on the ramp itself
const CLIMB: f32 = 1.5;
/// Fraction of the drive and turn power for close work at the sink
const CAREFUL: f32 = 0.75;

impl<IO: RobotIo> Robot<'_, IO> {
    /// Stows the arm and blocks until the start light turns red
    pub fn wait_for_start(&mut self) -> Result<()> {
        self.io.set_servo_degrees(ServoChannel::Arm, ARM_STOWED);
        self.wait_for_light(Color::Red)
    }

    /// Drives from the start box to the top of the ramp
    ///
    /// The motors are still running at climbing power on return.
    pub fn climb_ramp(&mut self) -> Result<()> {
        let drive = self.config.course.drive;
        let turn = self.config.course.turn;
        info!("climbing ramp");

        self.drive_to_ticks(2.0, RUN_UP * drive)?;
        self.move_linear(8.0, drive)?;
        self.pivot(45.0, turn)?;
        self.drive_to_ticks(22.0, CLIMB * drive)
    }

    /// Climbs the ramp and rams the sink to dump the tray, then backs onto
    /// the rear wall
    pub fn tray(&mut self) -> Result<()> {
        let drive = self.config.course.drive;
        let turn = self.config.course.turn;

        self.climb_ramp()?;
        self.move_linear(9.0, drive)?;
        self.pivot(-90.0, CAREFUL * turn)?;

        // square up on the side wall next to the sink
        self.drive_until_contact(SwitchSide::Front, CAREFUL * drive)?;
        self.move_linear(-3.0, CAREFUL * drive)?;
        self.pivot(-90.0, turn)?;

        // hit the sink hard enough to tip the tray
        self.drive_until_contact(SwitchSide::Front, CLIMB * drive)?;
        info!("tray dumped");

        self.move_linear(-10.0, drive)?;
        self.pivot(-90.0, turn)?;
        self.drive_until_contact(SwitchSide::Back, -drive)
    }

    /// Climbs the ramp and pushes into the burger station
    pub fn burger(&mut self) -> Result<()> {
        let drive = self.config.course.drive;
        let turn = self.config.course.turn;

        self.climb_ramp()?;
        self.move_linear(6.0, drive)?;
        self.pivot(90.0, turn)?;
        self.drive_until_contact(SwitchSide::Front, drive)?;
        info!("burger station reached");

        self.move_linear(-2.0, drive)?;
        self.pivot(90.0, turn)?;
        self.move_linear(-16.0, drive)?;
        Ok(())
    }

    /// Hooks the arm into the ticket slot and drags the ticket along
    pub fn ticket(&mut self) -> Result<()> {
        let drive = self.config.course.drive;
        let turn = self.config.course.turn;

        self.drive_until_contact(SwitchSide::Front, drive)?;
        self.move_linear(-6.5, drive)?;
        self.pivot(90.0, turn)?;
        self.move_linear(13.0, drive)?;
        self.pivot(45.0, turn)?;

        self.io.set_servo_degrees(ServoChannel::Arm, ARM_DEPLOYED);
        self.pivot(30.0, turn)?;
        self.move_linear(-2.0, drive)?;
        self.pivot(10.0, turn)?;
        self.move_linear(5.0, drive)?;
        info!("ticket slid");

        self.pivot(-45.0, turn)?;
        self.io.set_servo_degrees(ServoChannel::Arm, ARM_STOWED);
        self.pivot(45.0, turn)?;
        Ok(())
    }

    /// Reads the jukebox light, presses the matching button and hits the
    /// final button
    ///
    /// Anything but a red light is played as blue. Returns what was read.
    pub fn jukebox(&mut self) -> Result<Color> {
        let drive = self.config.course.drive;
        let turn = self.config.course.turn;

        self.drive_until_contact(SwitchSide::Front, drive)?;
        self.move_linear(-4.0, drive)?;
        self.pivot(-90.0, turn)?;

        let color = self.creep_until_color(0.1, drive)?;
        // the red button sits nearer the final zone
        let (offset, retreat) = match color {
            Color::Red => (45.0, -6.0),
            Color::Blue | Color::NoColor | Color::NoReading => (-45.0, -8.0),
        };
        info!("jukebox reads {:?}", color);

        self.pivot(offset, turn)?;
        self.move_linear(1.0, drive)?;
        self.pivot(-offset, turn)?;
        self.move_linear(3.0, drive)?;
        self.move_linear(-6.0, drive)?;

        self.pivot(-90.0, turn)?;
        self.move_linear(retreat, drive)?;
        self.pivot(45.0, turn)?;
        self.move_linear(13.0, drive)?;
        self.io.sleep(self.config.motion.settle());
        Ok(color)
    }
}
