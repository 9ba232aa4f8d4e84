//! Robot Configuration
//!
//! Every calibration constant of the robot lives here, grouped by the
//! component that consumes it. Defaults are the values measured on the
//! competition build.
//!
//! # Groups
//! - Geometry: wheel diameter, wheel track, encoder counts per wheel turn
//! - Motion: settle rest, poll pacing, stall timeout, which encoder to watch
//! - Color: CdS voltage bands for red, blue and "no colour"
//! - Line: optosensor break thresholds and the line following speed tiers
//! - Search: lost-line probe pattern
//! - Course: standard drive and turn power for the run script
//!
//! Durations are kept as integer milliseconds so the whole structure can be
//! serialized with the `serde` feature.

use embassy_time::Duration;

use super::error::ConfigError;

/// How a busy-wait loop paces itself between polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PollPolicy {
    /// Poll again immediately
    Tight,
    /// Sleep a fixed time after every poll
    FixedDelay { ms: u64 },
}

/// Encoder(s) a straight move watches for its tick target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncoderWatch {
    Left,
    Right,
    /// Wait until both counters reach the target
    Both,
}

/// Encoder(s) a pivot watches for its tick target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PivotWatch {
    /// Left encoder for right turns, right encoder for left turns
    OuterWheel,
    /// The same encoder(s) regardless of turn direction
    Fixed(EncoderWatch),
}

/// Physical constants of the drive train
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// Wheel diameter in inches
    pub wheel_diameter_in: f32,
    /// Distance between the two wheel contact points in inches
    pub wheel_track_in: f32,
    /// Encoder counts per wheel revolution
    pub ticks_per_rev: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            wheel_diameter_in: 2.5,
            wheel_track_in: 7.5,
            ticks_per_rev: 318.0,
        }
    }
}

/// Move and pivot behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// Rest after every move so momentum dies out
    pub settle_ms: u64,
    /// Pacing of the tick-target wait
    pub poll: PollPolicy,
    /// Longest a move may wait for its tick target; `None` waits forever
    pub timeout_ms: Option<u64>,
    /// Encoder(s) a straight move watches
    pub linear_watch: EncoderWatch,
    /// Encoder(s) a pivot watches
    pub pivot_watch: PivotWatch,
}

impl MotionConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            poll: PollPolicy::Tight,
            timeout_ms: Some(10_000),
            linear_watch: EncoderWatch::Left,
            pivot_watch: PivotWatch::OuterWheel,
        }
    }
}

/// Upper edges of the CdS voltage bands
///
/// (0, red_max] is red, (red_max, blue_max] is blue, (blue_max, top] is no
/// colour, anything else is no reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorBands {
    pub red_max: f32,
    pub blue_max: f32,
    pub top: f32,
}

impl Default for ColorBands {
    fn default() -> Self {
        Self {
            red_max: 0.90,
            blue_max: 1.80,
            top: 3.30,
        }
    }
}

/// CdS classification and waiting
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorConfig {
    pub bands: ColorBands,
    /// Longest `wait_for_light` may block; `None` waits forever
    pub wait_timeout_ms: Option<u64>,
}

impl ColorConfig {
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }
}

/// Optosensor break thresholds in volts; a reading above its threshold is
/// over the dark line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineThresholds {
    pub left: f32,
    pub center: f32,
    pub right: f32,
}

impl Default for LineThresholds {
    fn default() -> Self {
        Self {
            left: 1.15,
            center: 1.90,
            right: 2.75,
        }
    }
}

/// Which way the robot travels along the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FollowDirection {
    /// Positive percents; a line on the right speeds up the left wheel
    Forward,
    /// Negative percents; a line on the right speeds up the right wheel
    Reverse,
}

/// What the classifier does with a sensor pattern no line state describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnmatchedPolicy {
    /// Keep the state derived on the previous tick
    RetainPrevious,
    /// Treat the pattern as off the line and stop
    OffLine,
}

/// Line following speed tiers and loop behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineFollowConfig {
    pub thresholds: LineThresholds,
    pub direction: FollowDirection,
    /// Equal-speed creep while centred
    pub creep: f32,
    /// Creep once centred for `dwell_ms`
    pub dwell_creep: f32,
    /// Fast wheel when the line drifts under an outer and the center sensor
    pub near_correction: f32,
    /// Fast wheel when only an outer sensor still sees the line
    pub far_correction: f32,
    pub dwell_ms: u64,
    pub poll: PollPolicy,
    pub unmatched: UnmatchedPolicy,
    /// Longest a follow may run; `None` runs until its termination condition
    pub timeout_ms: Option<u64>,
}

impl LineFollowConfig {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for LineFollowConfig {
    fn default() -> Self {
        Self {
            thresholds: LineThresholds::default(),
            direction: FollowDirection::Reverse,
            creep: 10.0,
            dwell_creep: 20.0,
            near_correction: 20.0,
            far_correction: 30.0,
            dwell_ms: 2_000,
            poll: PollPolicy::Tight,
            unmatched: UnmatchedPolicy::RetainPrevious,
            timeout_ms: None,
        }
    }
}

/// Lost-line probe pattern
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSearchConfig {
    /// Probe `i` pivots `i * step_degrees`
    pub step_degrees: f32,
    pub probes: u8,
    pub speed: f32,
}

impl Default for LineSearchConfig {
    fn default() -> Self {
        Self {
            step_degrees: 10.0,
            probes: 6,
            speed: 25.0,
        }
    }
}

/// Standard powers for the run script
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CourseSpeeds {
    pub drive: f32,
    pub turn: f32,
}

impl Default for CourseSpeeds {
    fn default() -> Self {
        Self {
            drive: 50.0,
            turn: 25.0,
        }
    }
}

/// Complete robot configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotConfig {
    pub geometry: Geometry,
    pub motion: MotionConfig,
    pub color: ColorConfig,
    pub line: LineFollowConfig,
    pub search: LineSearchConfig,
    pub course: CourseSpeeds,
}

impl RobotConfig {
    /// Checks the invariants the components rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        if !(g.wheel_diameter_in > 0.0) {
            return Err(ConfigError::WheelDiameter);
        }
        if !(g.wheel_track_in > 0.0) {
            return Err(ConfigError::WheelTrack);
        }
        if !(g.ticks_per_rev > 0.0) {
            return Err(ConfigError::TicksPerRev);
        }

        let b = &self.color.bands;
        if !(0.0 < b.red_max && b.red_max < b.blue_max && b.blue_max < b.top) {
            return Err(ConfigError::ColorBands);
        }

        let l = &self.line;
        let speeds = [
            l.creep,
            l.dwell_creep,
            l.near_correction,
            l.far_correction,
            self.search.speed,
            self.course.drive,
            self.course.turn,
        ];
        if speeds.iter().any(|s| !(-100.0..=100.0).contains(s)) {
            return Err(ConfigError::SpeedOutOfRange);
        }

        Ok(())
    }
}
