//! Hardware Resource Naming
//!
//! Names every actuator and sensor channel the core touches. The board
//! binding maps each of these onto a physical pin; the core only ever refers
//! to them by these names.
//!
//! # Resource Groups
//! - Drive: left and right IGWAN motors, each with a shaft encoder
//! - Light: one CdS cell for the start light and target colour
//! - Line: three optosensors (left, center, right) on the chassis underside
//! - Contact: two microswitches on the front bumper, two on the back
//! - Attachments: arm and fork servos

/// One side of the differential drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

/// Analog inputs, all read as volts in [0, 3.3]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogInput {
    /// CdS cell facing the floor lights
    Cds,
    LineLeft,
    LineCenter,
    LineRight,
}

/// Digital inputs
///
/// The microswitches are wired with pull-ups: they read `true` while open
/// and `false` while pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitalInput {
    FrontLeftSwitch,
    FrontRightSwitch,
    BackLeftSwitch,
    BackRightSwitch,
}

/// Servo-driven attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoChannel {
    /// Ticket arm
    Arm,
    /// Burger fork
    Fork,
}

/// A bumper: the pair of microswitches on one end of the chassis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwitchSide {
    Front,
    Back,
}

impl SwitchSide {
    /// Decodes the numeric side used by run scripts: 0 = front, 1 = back
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SwitchSide::Front),
            1 => Some(SwitchSide::Back),
            _ => None,
        }
    }

    /// The (left, right) switches of this bumper
    pub fn switches(self) -> (DigitalInput, DigitalInput) {
        match self {
            SwitchSide::Front => (DigitalInput::FrontLeftSwitch, DigitalInput::FrontRightSwitch),
            SwitchSide::Back => (DigitalInput::BackLeftSwitch, DigitalInput::BackRightSwitch),
        }
    }
}
