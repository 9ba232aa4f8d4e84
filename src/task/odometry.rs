//! Odometry conversion
//!
//! Turns a straight distance or an in-place rotation into the number of
//! encoder counts one wheel has to travel.
//!
//! # Calculations
//! ```text
//! linear ticks = K / (D * PI) * |distance|
//! pivot ticks  = K * W / (360 * D) * |degrees|
//! Where:
//! - K is encoder counts per wheel revolution
//! - D is the wheel diameter
//! - W is the wheel track (wheel to wheel distance)
//! ```
//! During a pivot each wheel rolls along a circle of diameter W around the
//! robot's center, so one degree is W * PI / 360 inches of wheel travel.

use core::f32::consts::PI;

use crate::system::config::Geometry;

/// Distance/angle to encoder count conversion for one robot build
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Odometry {
    ticks_per_inch: f32,
    ticks_per_degree: f32,
}

impl Odometry {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            ticks_per_inch: geometry.ticks_per_rev / (geometry.wheel_diameter_in * PI),
            ticks_per_degree: geometry.ticks_per_rev * geometry.wheel_track_in
                / (360.0 * geometry.wheel_diameter_in),
        }
    }

    /// Encoder counts for a straight move; sign of the distance is ignored
    pub fn ticks_for_linear(&self, distance_in: f32) -> f32 {
        self.ticks_per_inch * libm::fabsf(distance_in)
    }

    /// Encoder counts for a pivot; sign of the angle is ignored
    pub fn ticks_for_pivot(&self, degrees: f32) -> f32 {
        self.ticks_per_degree * libm::fabsf(degrees)
    }

    /// Inverse of [`Self::ticks_for_linear`], for reporting
    pub fn inches_for_ticks(&self, ticks: u32) -> f32 {
        ticks as f32 / self.ticks_per_inch
    }

    /// Inverse of [`Self::ticks_for_pivot`], for reporting
    pub fn degrees_for_ticks(&self, ticks: u32) -> f32 {
        ticks as f32 / self.ticks_per_degree
    }
}
