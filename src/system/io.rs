//! Hardware capability
//!
//! Everything the core needs from the board, as one trait. The firmware
//! implements it on real pins; the host tests implement it on a simulated
//! robot. A [`crate::Robot`] owns its `RobotIo` value, so only the operation
//! currently running can reach the motors and encoders.

use embassy_time::{Duration, Instant};

use super::resources::{AnalogInput, DigitalInput, ServoChannel, Side};

/// Primitive hardware operations
pub trait RobotIo {
    /// Commands a motor, percent in [-100, 100], positive drives forward
    fn set_motor_percent(&mut self, side: Side, percent: f32);

    /// Removes drive from a motor
    fn stop_motor(&mut self, side: Side);

    /// Encoder edges counted since the last reset
    fn encoder_counts(&mut self, side: Side) -> u32;

    /// Zeroes an encoder counter
    fn reset_encoder(&mut self, side: Side);

    /// Reads an analog input in volts
    fn read_analog(&mut self, input: AnalogInput) -> f32;

    /// Reads a digital input level
    fn read_digital(&mut self, input: DigitalInput) -> bool;

    /// Moves a servo attachment to an angle in degrees
    fn set_servo_degrees(&mut self, servo: ServoChannel, degrees: f32);

    /// Blocks for the given duration
    fn sleep(&mut self, duration: Duration);

    /// Monotonic time
    fn now(&mut self) -> Instant;

    /// Commands both motors, left first
    fn drive(&mut self, left: f32, right: f32) {
        self.set_motor_percent(Side::Left, left);
        self.set_motor_percent(Side::Right, right);
    }

    /// Stops both motors, left first
    fn stop_both(&mut self) {
        self.stop_motor(Side::Left);
        self.stop_motor(Side::Right);
    }

    /// Zeroes both encoder counters
    fn reset_encoders(&mut self) {
        self.reset_encoder(Side::Left);
        self.reset_encoder(Side::Right);
    }
}
