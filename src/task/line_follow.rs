//! Line Following Module
//!
//! Three optosensors sit across the chassis underside. Each is compared with
//! its own break threshold: a reading above the threshold is over the dark
//! line. The resulting 3-bit pattern selects one of six line states, and
//! each state selects a differential wheel command.
//!
//! # Patterns
//! ```text
//! left   center  right  -> state
//! light  dark    light  -> OnLine
//! light  dark    dark   -> LineOnRight
//! dark   dark    light  -> LineOnLeft
//! light  light   dark   -> LineFarRight
//! dark   light   light  -> LineFarLeft
//! light  light   light  -> OffLine
//! dark   dark    dark   -> unmatched
//! dark   light   dark   -> unmatched
//! ```
//! Unmatched patterns are resolved by [`UnmatchedPolicy`].
//!
//! # Wheel Commands (forward, fast wheel in brackets)
//! - OnLine: both at the creep speed, raised to the dwell creep once the
//!   robot has stayed on the line for the dwell time
//! - LineOnRight / LineOnLeft: [left] / [right] at the near correction
//! - LineFarRight / LineFarLeft: [left] / [right] at the far correction
//! - OffLine: both stopped
//!
//! Following in reverse negates every speed and moves the correction to the
//! opposite wheel.

use embassy_time::{Duration, Instant};

use crate::robot::Robot;
use crate::system::config::{FollowDirection, LineFollowConfig, LineThresholds, UnmatchedPolicy};
use crate::system::error::{Operation, Result};
use crate::system::io::RobotIo;
use crate::system::poll::{pace, Deadline};
use crate::system::resources::{AnalogInput, SwitchSide};
use crate::system::state::MotionPhase;

/// Where the line is relative to the sensor bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineState {
    OnLine,
    LineOnRight,
    LineOnLeft,
    LineFarRight,
    LineFarLeft,
    OffLine,
}

/// One sample of the three optosensors, in volts
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineReading {
    pub left: f32,
    pub center: f32,
    pub right: f32,
}

/// Which sensors are over the dark line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DarkPattern {
    pub left: bool,
    pub center: bool,
    pub right: bool,
}

impl LineThresholds {
    /// Dark/light pattern of one sample
    ///
    /// A reading exactly on its threshold is neither dark nor light, so the
    /// sample has no pattern and is handled like an unmatched one.
    pub fn pattern(&self, reading: &LineReading) -> Option<DarkPattern> {
        Some(DarkPattern {
            left: shade(reading.left, self.left)?,
            center: shade(reading.center, self.center)?,
            right: shade(reading.right, self.right)?,
        })
    }

    /// Whether any sensor reads above its threshold
    pub fn any_dark(&self, reading: &LineReading) -> bool {
        reading.left > self.left || reading.center > self.center || reading.right > self.right
    }
}

/// `Some(true)` above the threshold, `Some(false)` below, `None` on it
fn shade(volts: f32, threshold: f32) -> Option<bool> {
    if volts > threshold {
        Some(true)
    } else if volts < threshold {
        Some(false)
    } else {
        None
    }
}

impl DarkPattern {
    /// State described by this pattern, `None` for the two unmatched ones
    pub fn line_state(self) -> Option<LineState> {
        match (self.left, self.center, self.right) {
            (false, true, false) => Some(LineState::OnLine),
            (false, true, true) => Some(LineState::LineOnRight),
            (true, true, false) => Some(LineState::LineOnLeft),
            (false, false, true) => Some(LineState::LineFarRight),
            (true, false, false) => Some(LineState::LineFarLeft),
            (false, false, false) => Some(LineState::OffLine),
            (true, true, true) | (true, false, true) => None,
        }
    }
}

/// Motor percents for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelSpeeds {
    pub left: f32,
    pub right: f32,
}

impl WheelSpeeds {
    pub const STOP: Self = Self { left: 0.0, right: 0.0 };

    pub fn is_stop(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// When a follow ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Termination {
    /// Never; only a timeout or cancellation ends the follow
    Unconditional,
    /// Both switches of the bumper are pressed
    Contact(SwitchSide),
    /// All three sensors read light
    OffLine,
}

impl Termination {
    /// Decodes the numeric mode used by run scripts:
    /// 0 = unconditional, 1 = back bumper contact, 2 = off the line
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Termination::Unconditional),
            1 => Some(Termination::Contact(SwitchSide::Back)),
            2 => Some(Termination::OffLine),
            _ => None,
        }
    }
}

/// Line state machine with its on-line dwell timer
#[derive(Debug, Clone)]
pub struct LineFollower {
    config: LineFollowConfig,
    state: LineState,
    on_line_since: Option<Instant>,
    dwelling: bool,
}

impl LineFollower {
    /// Starts off the line with the dwell timer unset
    pub fn new(config: LineFollowConfig) -> Self {
        Self {
            config,
            state: LineState::OffLine,
            on_line_since: None,
            dwelling: false,
        }
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    /// Derives the state for this tick and runs the dwell timer
    pub fn update(&mut self, pattern: DarkPattern, now: Instant) -> LineState {
        self.observe(pattern.line_state(), now)
    }

    /// Same as [`Self::update`] for an already matched sample, `None` when
    /// the sample named no state
    pub fn observe(&mut self, matched: Option<LineState>, now: Instant) -> LineState {
        let next = match matched {
            Some(state) => state,
            None => match self.config.unmatched {
                UnmatchedPolicy::RetainPrevious => {
                    trace!("unmatched sample, keeping {:?}", self.state);
                    self.state
                }
                UnmatchedPolicy::OffLine => LineState::OffLine,
            },
        };

        if next != self.state {
            debug!("line state {:?} -> {:?}", self.state, next);
        }
        self.state = next;

        if next == LineState::OnLine {
            let since = *self.on_line_since.get_or_insert(now);
            let held = now
                .checked_duration_since(since)
                .unwrap_or(Duration::from_ticks(0));
            if !self.dwelling && held >= self.config.dwell() {
                info!("on line for {} ms, creeping faster", held.as_millis());
                self.dwelling = true;
            }
        } else {
            self.on_line_since = None;
            self.dwelling = false;
        }

        next
    }

    /// Wheel command for the current state
    pub fn wheel_speeds(&self) -> WheelSpeeds {
        let c = &self.config;
        // (left, right) when following forward
        let (left, right) = match self.state {
            LineState::OnLine if self.dwelling => (c.dwell_creep, c.dwell_creep),
            LineState::OnLine => (c.creep, c.creep),
            LineState::LineOnRight => (c.near_correction, c.creep),
            LineState::LineOnLeft => (c.creep, c.near_correction),
            LineState::LineFarRight => (c.far_correction, c.creep),
            LineState::LineFarLeft => (c.creep, c.far_correction),
            LineState::OffLine => return WheelSpeeds::STOP,
        };

        match c.direction {
            FollowDirection::Forward => WheelSpeeds { left, right },
            FollowDirection::Reverse => WheelSpeeds {
                left: -right,
                right: -left,
            },
        }
    }
}

impl<IO: RobotIo> Robot<'_, IO> {
    /// Samples the three optosensors, left to right
    pub fn read_line(&mut self) -> LineReading {
        LineReading {
            left: self.io.read_analog(AnalogInput::LineLeft),
            center: self.io.read_analog(AnalogInput::LineCenter),
            right: self.io.read_analog(AnalogInput::LineRight),
        }
    }

    /// Follows the line until `termination` holds
    ///
    /// Each tick samples the sensors once; the same sample decides
    /// termination and the wheel command. The motors are stopped on every
    /// exit.
    pub fn follow_line(&mut self, termination: Termination) -> Result<()> {
        info!("following line until {:?}", termination);
        let line = self.config.line;
        let mut follower = LineFollower::new(line);
        let deadline = Deadline::start(&mut self.io, Operation::FollowLine, line.timeout());
        self.phase.set(MotionPhase::Moving);

        let outcome = loop {
            let reading = self.read_line();
            let matched = line.thresholds.pattern(&reading).and_then(DarkPattern::line_state);
            if self.termination_met(termination, matched) {
                info!("line following ended in {:?}", follower.state());
                break Ok(());
            }

            let now = self.io.now();
            follower.observe(matched, now);
            let speeds = follower.wheel_speeds();
            if speeds.is_stop() {
                self.io.stop_both();
            } else {
                self.io.drive(speeds.left, speeds.right);
            }

            if let Err(e) = deadline.check(&mut self.io, self.cancel) {
                break Err(e);
            }
            pace(&mut self.io, line.poll);
        };

        self.io.stop_both();
        self.phase.set(MotionPhase::Idle);
        outcome
    }

    /// [`Self::follow_line`] with a numeric termination mode
    ///
    /// An unknown mode skips line following.
    pub fn follow_line_code(&mut self, code: u8) -> Result<()> {
        match Termination::from_code(code) {
            Some(termination) => self.follow_line(termination),
            None => {
                warn!("no line following end condition {}, skipping", code);
                Ok(())
            }
        }
    }

    fn termination_met(&mut self, termination: Termination, matched: Option<LineState>) -> bool {
        match termination {
            Termination::Unconditional => false,
            Termination::Contact(side) => self.switches_pressed(side),
            Termination::OffLine => matched == Some(LineState::OffLine),
        }
    }
}
