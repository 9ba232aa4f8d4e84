//! Drive Module
//!
//! Encoder dead reckoning for straight moves and in-place pivots.
//!
//! # Move Sequence
//! 1. Convert the request into an encoder count target
//! 2. Zero both encoders so earlier residue cannot bias this move
//! 3. Command both motors (same sign for a move, opposite for a pivot)
//! 4. Busy-poll the watched encoder until it reaches the target
//! 5. Stop both motors, zero both encoders again, rest for the settle time
//!
//! Step 5 runs on every exit, including timeout and cancellation, so a move
//! always leaves the motors stopped and the counters at zero.
//!
//! A straight move finishes when the watched count is at least the target;
//! a pivot finishes once the count is past it.

use crate::robot::Robot;
use crate::system::config::{EncoderWatch, PivotWatch};
use crate::system::error::{Operation, Result};
use crate::system::io::RobotIo;
use crate::system::poll::{pace, Deadline};
use crate::system::resources::Side;
use crate::system::state::MotionPhase;
use crate::task::odometry::Odometry;

/// Outcome of a completed move
///
/// Counts are read after the motors stopped and before the final reset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveReport {
    pub target_ticks: f32,
    pub left_ticks: u32,
    pub right_ticks: u32,
}

/// When the watched count satisfies the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitRule {
    AtLeast,
    Beyond,
}

impl ExitRule {
    fn reached(self, counts: u32, target: f32) -> bool {
        let counts = counts as f32;
        match self {
            ExitRule::AtLeast => counts >= target,
            ExitRule::Beyond => counts > target,
        }
    }
}

/// Motor percents for a straight move, `None` when there is nothing to do
fn linear_command(distance_in: f32, speed: f32) -> Option<(f32, f32)> {
    if distance_in > 0.0 {
        Some((speed, speed))
    } else if distance_in < 0.0 {
        Some((-speed, -speed))
    } else {
        None
    }
}

/// Motor percents for a pivot; positive degrees turn right
fn pivot_command(degrees: f32, speed: f32) -> Option<(f32, f32)> {
    if degrees > 0.0 {
        Some((speed, -speed))
    } else if degrees < 0.0 {
        Some((-speed, speed))
    } else {
        None
    }
}

/// Encoder(s) a pivot in this direction waits on
fn pivot_encoders(watch: PivotWatch, degrees: f32) -> EncoderWatch {
    match watch {
        PivotWatch::OuterWheel if degrees > 0.0 => EncoderWatch::Left,
        PivotWatch::OuterWheel => EncoderWatch::Right,
        PivotWatch::Fixed(encoders) => encoders,
    }
}

impl<IO: RobotIo> Robot<'_, IO> {
    /// Drives straight, positive distance forward, in inches
    pub fn move_linear(&mut self, distance_in: f32, speed: f32) -> Result<MoveReport> {
        let odometry = Odometry::new(&self.config.geometry);
        let target = odometry.ticks_for_linear(distance_in);
        info!("moving {} in at {}%, target {} ticks", distance_in, speed, target);

        let command = linear_command(distance_in, clamp_percent(speed));
        let report = self.run_to_target(
            Operation::LinearMove,
            target,
            command,
            self.config.motion.linear_watch,
            ExitRule::AtLeast,
        )?;

        info!(
            "actual movement L:{} in R:{} in",
            odometry.inches_for_ticks(report.left_ticks),
            odometry.inches_for_ticks(report.right_ticks)
        );
        Ok(report)
    }

    /// Turns in place, positive degrees to the right
    pub fn pivot(&mut self, degrees: f32, speed: f32) -> Result<MoveReport> {
        self.pivot_with(degrees, speed, self.config.motion.pivot_watch)
    }

    /// Turns in place, waiting on an explicitly chosen encoder
    pub fn pivot_with(&mut self, degrees: f32, speed: f32, watch: PivotWatch) -> Result<MoveReport> {
        let odometry = Odometry::new(&self.config.geometry);
        let target = odometry.ticks_for_pivot(degrees);
        info!("turning {} deg at {}%, target {} ticks", degrees, speed, target);

        let command = pivot_command(degrees, clamp_percent(speed));
        let report = self.run_to_target(
            Operation::Pivot,
            target,
            command,
            pivot_encoders(watch, degrees),
            ExitRule::Beyond,
        )?;

        info!(
            "actual turn L:{} deg R:{} deg",
            odometry.degrees_for_ticks(report.left_ticks),
            odometry.degrees_for_ticks(report.right_ticks)
        );
        Ok(report)
    }

    /// Drives straight until the distance is covered but keeps the motors
    /// running, so the next move can change speed without halting
    ///
    /// Used on the ramp, where stopping would throw the tray. The motors
    /// are only stopped (and the encoders zeroed) if the wait fails.
    pub fn drive_to_ticks(&mut self, distance_in: f32, speed: f32) -> Result<()> {
        let target = Odometry::new(&self.config.geometry).ticks_for_linear(distance_in);
        info!("rolling {} in at {}%, target {} ticks", distance_in, speed, target);

        let Some((left, right)) = linear_command(distance_in, clamp_percent(speed)) else {
            return Ok(());
        };

        self.io.reset_encoders();
        self.phase.set(MotionPhase::Moving);
        self.io.drive(left, right);

        let watch = self.config.motion.linear_watch;
        if let Err(e) = self.wait_for_ticks(Operation::RollOn, target, watch, ExitRule::AtLeast) {
            self.io.stop_both();
            self.io.reset_encoders();
            self.phase.set(MotionPhase::Idle);
            return Err(e);
        }
        Ok(())
    }

    fn run_to_target(
        &mut self,
        operation: Operation,
        target: f32,
        command: Option<(f32, f32)>,
        watch: EncoderWatch,
        rule: ExitRule,
    ) -> Result<MoveReport> {
        self.io.reset_encoders();

        let outcome = match command {
            Some((left, right)) => {
                self.phase.set(MotionPhase::Moving);
                self.io.drive(left, right);
                self.wait_for_ticks(operation, target, watch, rule)
            }
            None => Ok(()),
        };

        self.io.stop_both();
        self.phase.set(MotionPhase::Stopped);
        let report = MoveReport {
            target_ticks: target,
            left_ticks: self.io.encoder_counts(Side::Left),
            right_ticks: self.io.encoder_counts(Side::Right),
        };
        self.io.reset_encoders();
        self.io.sleep(self.config.motion.settle());
        self.phase.set(MotionPhase::Idle);

        outcome.map(|()| report)
    }

    fn wait_for_ticks(&mut self, operation: Operation, target: f32, watch: EncoderWatch, rule: ExitRule) -> Result<()> {
        let deadline = Deadline::start(&mut self.io, operation, self.config.motion.timeout());
        loop {
            let counts = self.watched_counts(watch);
            if rule.reached(counts, target) {
                return Ok(());
            }
            deadline.check(&mut self.io, self.cancel)?;
            pace(&mut self.io, self.config.motion.poll);
        }
    }

    fn watched_counts(&mut self, watch: EncoderWatch) -> u32 {
        match watch {
            EncoderWatch::Left => self.io.encoder_counts(Side::Left),
            EncoderWatch::Right => self.io.encoder_counts(Side::Right),
            EncoderWatch::Both => {
                let left = self.io.encoder_counts(Side::Left);
                let right = self.io.encoder_counts(Side::Right);
                left.min(right)
            }
        }
    }
}

fn clamp_percent(speed: f32) -> f32 {
    speed.clamp(-100.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::cancel::CancelToken;
    use crate::system::config::{PollPolicy, RobotConfig};
    use crate::system::error::Error;
    use crate::testing::{IoEvent, SimIo};
    use approx::assert_relative_eq;
    use embassy_time::Duration;

    fn robot(io: SimIo, cancel: &CancelToken) -> Robot<'_, SimIo> {
        Robot::new(io, RobotConfig::default(), cancel).unwrap()
    }

    fn robot_with(io: SimIo, config: RobotConfig, cancel: &CancelToken) -> Robot<'_, SimIo> {
        Robot::new(io, config, cancel).unwrap()
    }

    #[test]
    fn ten_inches_forward() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);

        let report = robot.move_linear(10.0, 50.0).unwrap();

        assert_relative_eq!(report.target_ticks, 404.89, epsilon = 0.01);
        assert!((405..=406).contains(&report.left_ticks), "left {}", report.left_ticks);
        assert!(report.right_ticks >= 404);

        let io = robot.io_mut();
        // stop from new(), the move itself, the final stop
        assert_eq!(io.drive_pairs(), vec![(0.0, 0.0), (50.0, 50.0), (0.0, 0.0)]);
        assert_eq!(io.raw_counts(Side::Left), 0);
        assert_eq!(io.raw_counts(Side::Right), 0);
        assert_eq!(robot.motion_phase(), MotionPhase::Idle);
    }

    #[test]
    fn encoders_reset_before_and_after_and_settle_last() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);
        robot.io_mut().events.clear();

        robot.move_linear(2.0, 50.0).unwrap();

        let events = &robot.io_mut().events;
        assert_eq!(events[0], IoEvent::ResetEncoder(Side::Left));
        assert_eq!(events[1], IoEvent::ResetEncoder(Side::Right));
        assert_eq!(events[2], IoEvent::Motor(Side::Left, 50.0));
        let n = events.len();
        assert_eq!(events[n - 3], IoEvent::ResetEncoder(Side::Left));
        assert_eq!(events[n - 2], IoEvent::ResetEncoder(Side::Right));
        assert_eq!(events[n - 1], IoEvent::Sleep(Duration::from_millis(100)));
    }

    #[test]
    fn backwards_drives_both_motors_negative() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);

        let report = robot.move_linear(-4.0, 50.0).unwrap();

        assert_eq!(robot.io_mut().moving_pairs(), vec![(-50.0, -50.0)]);
        assert!(report.left_ticks as f32 >= report.target_ticks);
    }

    #[test]
    fn zero_distance_never_drives() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);

        let report = robot.move_linear(0.0, 50.0).unwrap();

        assert_eq!(report.target_ticks, 0.0);
        assert!(robot.io_mut().moving_pairs().is_empty());
        assert_eq!(robot.motion_phase(), MotionPhase::Idle);
    }

    #[test]
    fn right_pivot_runs_wheels_opposite_and_passes_target() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);

        let report = robot.pivot(90.0, 25.0).unwrap();

        assert_eq!(robot.io_mut().moving_pairs(), vec![(25.0, -25.0)]);
        assert_relative_eq!(report.target_ticks, 238.5, epsilon = 0.01);
        assert!(report.left_ticks as f32 > report.target_ticks);
    }

    #[test]
    fn left_pivot_watches_the_right_encoder() {
        let cancel = CancelToken::new();
        // the left encoder is dead, a left turn must still finish
        let mut robot = robot(SimIo::new().stalled(Side::Left), &cancel);

        let report = robot.pivot(-45.0, 25.0).unwrap();

        assert_eq!(robot.io_mut().moving_pairs(), vec![(-25.0, 25.0)]);
        assert_eq!(report.left_ticks, 0);
        assert!(report.right_ticks as f32 > report.target_ticks);
    }

    #[test]
    fn fixed_pivot_watch_overrides_turn_direction() {
        let cancel = CancelToken::new();
        let mut config = RobotConfig::default();
        config.motion.timeout_ms = Some(500);
        let mut robot = robot_with(SimIo::new().stalled(Side::Left), config, &cancel);

        let result = robot.pivot_with(-45.0, 25.0, PivotWatch::Fixed(EncoderWatch::Left));

        assert!(matches!(
            result,
            Err(Error::Timeout {
                operation: Operation::Pivot,
                ..
            })
        ));
    }

    #[test]
    fn stalled_encoder_times_out_and_leaves_robot_safe() {
        let cancel = CancelToken::new();
        let mut config = RobotConfig::default();
        config.motion.timeout_ms = Some(500);
        let mut robot = robot_with(SimIo::new().stalled(Side::Left), config, &cancel);

        let result = robot.move_linear(10.0, 50.0);

        match result {
            Err(Error::Timeout { operation, waited_ms }) => {
                assert_eq!(operation, Operation::LinearMove);
                assert!(waited_ms > 500);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        let io = robot.io_mut();
        assert_eq!(io.motor(Side::Left), 0.0);
        assert_eq!(io.motor(Side::Right), 0.0);
        assert_eq!(io.raw_counts(Side::Right), 0);
        assert_eq!(robot.motion_phase(), MotionPhase::Idle);
    }

    #[test]
    fn both_encoders_must_reach_target_when_configured() {
        let cancel = CancelToken::new();
        let mut config = RobotConfig::default();
        config.motion.linear_watch = EncoderWatch::Both;
        config.motion.timeout_ms = Some(2_000);
        let mut robot = robot_with(SimIo::new().stalled(Side::Right), config, &cancel);

        assert!(robot.move_linear(5.0, 50.0).is_err());
    }

    #[test]
    fn cancelled_move_stops_immediately() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);
        cancel.cancel();

        let result = robot.move_linear(10.0, 50.0);

        assert_eq!(
            result,
            Err(Error::Cancelled {
                operation: Operation::LinearMove
            })
        );
        let io = robot.io_mut();
        assert_eq!(io.motor(Side::Left), 0.0);
        assert_eq!(io.raw_counts(Side::Left), 0);
        // one poll of the encoder before the token was seen
        assert!(io.elapsed() < Duration::from_millis(150));
    }

    #[test]
    fn fixed_delay_polling_sleeps_between_reads() {
        let cancel = CancelToken::new();
        let mut config = RobotConfig::default();
        config.motion.poll = PollPolicy::FixedDelay { ms: 100 };
        let mut robot = robot_with(SimIo::new(), config, &cancel);

        let report = robot.move_linear(1.0, 50.0).unwrap();

        let sleeps = robot
            .io_mut()
            .events
            .iter()
            .filter(|e| matches!(e, IoEvent::Sleep(_)))
            .count();
        // 40.5 ticks at one tick per ms: one 100 ms poll gap, then the settle rest
        assert_eq!(sleeps, 2);
        assert!(report.left_ticks >= 41);
    }

    #[test]
    fn roll_on_keeps_motors_running_into_the_next_move() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);
        robot.io_mut().events.clear();

        robot.drive_to_ticks(2.0, 32.5).unwrap();
        assert_eq!(robot.motion_phase(), MotionPhase::Moving);
        assert_eq!(robot.io_mut().motor(Side::Left), 32.5);

        robot.move_linear(8.0, 50.0).unwrap();

        assert_eq!(
            robot.io_mut().drive_pairs(),
            vec![(32.5, 32.5), (50.0, 50.0), (0.0, 0.0)]
        );
    }

    #[test]
    fn speed_is_clamped_to_percent_range() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new(), &cancel);

        robot.move_linear(1.0, 150.0).unwrap();

        assert_eq!(robot.io_mut().moving_pairs(), vec![(100.0, 100.0)]);
    }
}
