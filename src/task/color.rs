//! CdS Color Module
//!
//! The CdS cell under the chassis reads the floor lights. Its voltage drops
//! as the light gets brighter: a red light reads lowest, a blue one a bit
//! higher, ambient light higher still. The same classification serves as
//! the start signal (red) and to tell which jukebox button to press.

use crate::robot::Robot;
use crate::system::config::ColorBands;
use crate::system::error::{Operation, Result};
use crate::system::io::RobotIo;
use crate::system::poll::{pace, Deadline};
use crate::system::resources::AnalogInput;

/// What the CdS cell sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Red,
    Blue,
    /// Ambient light only
    NoColor,
    /// Reading outside every band (zero, negative, above the top edge, NaN)
    NoReading,
}

impl ColorBands {
    /// Maps a CdS voltage onto its band, first matching band wins
    pub fn classify(&self, volts: f32) -> Color {
        if volts > 0.0 && volts <= self.red_max {
            Color::Red
        } else if volts > self.red_max && volts <= self.blue_max {
            Color::Blue
        } else if volts > self.blue_max && volts <= self.top {
            Color::NoColor
        } else {
            Color::NoReading
        }
    }
}

impl<IO: RobotIo> Robot<'_, IO> {
    /// Reads the CdS cell once and classifies it
    pub fn classify_color(&mut self) -> Color {
        let volts = self.io.read_analog(AnalogInput::Cds);
        let color = self.config.color.bands.classify(volts);
        debug!("cds {} V -> {:?}", volts, color);
        color
    }

    /// Blocks until the CdS cell sees `color`
    pub fn wait_for_light(&mut self, color: Color) -> Result<()> {
        info!("waiting for {:?} light", color);
        let deadline = Deadline::start(&mut self.io, Operation::WaitForLight, self.config.color.wait_timeout());
        loop {
            if self.classify_color() == color {
                info!("{:?} light seen", color);
                return Ok(());
            }
            deadline.check(&mut self.io, self.cancel)?;
            pace(&mut self.io, self.config.motion.poll);
        }
    }

    /// Inches forward in short moves until the cell sees anything other than
    /// ambient light, and returns what it saw
    pub fn creep_until_color(&mut self, step_in: f32, speed: f32) -> Result<Color> {
        let deadline = Deadline::start(&mut self.io, Operation::ColorApproach, self.config.color.wait_timeout());
        loop {
            self.move_linear(step_in, speed)?;
            self.io.sleep(self.config.motion.settle());

            let color = self.classify_color();
            if color != Color::NoColor {
                info!("approach ended on {:?}", color);
                return Ok(color);
            }
            deadline.check(&mut self.io, self.cancel)?;
        }
    }
}
