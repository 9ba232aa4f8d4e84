//! Lost-line search
//!
//! Sweeps back and forth in growing arcs until any optosensor is over the
//! line: probe `i` pivots `i * step` degrees, right on odd probes and left on
//! even ones, so the sweep alternates around the starting heading.

use crate::robot::Robot;
use crate::system::error::Result;
use crate::system::io::RobotIo;

/// Pivot angle of probe `i`, counted from 1
fn probe_degrees(step_degrees: f32, i: u8) -> f32 {
    let degrees = step_degrees * f32::from(i);
    if i % 2 == 1 {
        degrees
    } else {
        -degrees
    }
}

impl<IO: RobotIo> Robot<'_, IO> {
    /// Pivots until a sensor sees the line or the probes run out
    ///
    /// Running out is not an error; the robot may still be off the line
    /// afterwards.
    pub fn find_line(&mut self) -> Result<()> {
        let search = self.config.search;
        let thresholds = self.config.line.thresholds;

        for i in 1..=search.probes {
            let reading = self.read_line();
            if thresholds.any_dark(&reading) {
                info!("line found after {} probes", i - 1);
                return Ok(());
            }
            self.pivot(probe_degrees(search.step_degrees, i), search.speed)?;
        }

        warn!("line not found after {} probes", search.probes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::cancel::CancelToken;
    use crate::system::config::RobotConfig;
    use crate::system::error::{Error, Operation};
    use crate::testing::SimIo;

    const LIGHT: (f32, f32, f32) = (0.5, 0.5, 0.5);
    const CENTER_DARK: (f32, f32, f32) = (0.5, 2.5, 0.5);
    const RIGHT_DARK: (f32, f32, f32) = (0.5, 0.5, 3.0);

    fn robot(io: SimIo, cancel: &CancelToken) -> Robot<'_, SimIo> {
        Robot::new(io, RobotConfig::default(), cancel).unwrap()
    }

    #[test]
    fn probe_pattern_alternates_and_grows() {
        let angles: Vec<f32> = (1..=6).map(|i| probe_degrees(10.0, i)).collect();
        assert_eq!(angles, vec![10.0, -20.0, 30.0, -40.0, 50.0, -60.0]);
    }

    #[test]
    fn already_on_line() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new().with_line_frames(&[CENTER_DARK]), &cancel);

        robot.find_line().unwrap();

        assert!(robot.io_mut().moving_pairs().is_empty());
    }

    #[test]
    fn stops_sweeping_once_any_sensor_is_dark() {
        let cancel = CancelToken::new();
        let io = SimIo::new().with_line_frames(&[LIGHT, LIGHT, RIGHT_DARK]);
        let mut robot = robot(io, &cancel);

        robot.find_line().unwrap();

        // right 10 deg, then left 20 deg
        assert_eq!(robot.io_mut().moving_pairs(), vec![(25.0, -25.0), (-25.0, 25.0)]);
    }

    #[test]
    fn gives_up_quietly_after_six_probes() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new().with_line_frames(&[LIGHT]), &cancel);

        assert_eq!(robot.find_line(), Ok(()));

        let pairs = robot.io_mut().moving_pairs();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[4], (25.0, -25.0));
        assert_eq!(pairs[5], (-25.0, 25.0));
    }

    #[test]
    fn failed_pivot_ends_the_search() {
        let cancel = CancelToken::new();
        let mut robot = robot(SimIo::new().with_line_frames(&[LIGHT]), &cancel);
        cancel.cancel();

        assert_eq!(
            robot.find_line(),
            Err(Error::Cancelled {
                operation: Operation::Pivot
            })
        );
        assert_eq!(robot.io_mut().moving_pairs().len(), 1);
    }
}
