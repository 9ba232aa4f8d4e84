//! Simulated robot for host tests
//!
//! [`SimIo`] keeps a virtual clock that advances one poll period on every
//! sensor read and by the requested amount on every sleep. Encoders advance
//! in proportion to the commanded motor percent over that virtual time.
//! Analog and digital inputs are scripted: each read takes the next queued
//! value and the last value repeats once the queue is empty.

use std::collections::{HashMap, VecDeque};

use embassy_time::{Duration, Instant};

use crate::system::io::RobotIo;
use crate::system::resources::{AnalogInput, DigitalInput, ServoChannel, Side};

/// Encoder counts per motor percent per second of virtual time
///
/// 50 % gives one count per millisecond.
const COUNTS_PER_PERCENT_SECOND: f32 = 20.0;

/// Virtual time consumed by one sensor read
const POLL_PERIOD_US: u64 = 1_000;

struct Script<T: Copy> {
    pending: VecDeque<T>,
    last: T,
}

impl<T: Copy> Script<T> {
    fn constant(value: T) -> Self {
        Self {
            pending: VecDeque::new(),
            last: value,
        }
    }

    fn sequence(values: &[T]) -> Self {
        let last = *values.first().expect("sequence needs at least one value");
        Self {
            pending: values.iter().copied().collect(),
            last,
        }
    }

    fn next(&mut self) -> T {
        if let Some(value) = self.pending.pop_front() {
            self.last = value;
        }
        self.last
    }
}

/// Everything the simulated robot was asked to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum IoEvent {
    Motor(Side, f32),
    ResetEncoder(Side),
    Servo(ServoChannel, f32),
    Sleep(Duration),
}

pub(crate) struct SimIo {
    clock_us: u64,
    motors: [f32; 2],
    encoders: [f32; 2],
    stalled: [bool; 2],
    analog: HashMap<AnalogInput, Script<f32>>,
    digital: HashMap<DigitalInput, Script<bool>>,
    pub(crate) events: Vec<IoEvent>,
}

fn index(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

impl SimIo {
    /// Robot on a bright floor: line sensors light, CdS reading nothing,
    /// every switch open
    pub(crate) fn new() -> Self {
        Self {
            clock_us: 0,
            motors: [0.0; 2],
            encoders: [0.0; 2],
            stalled: [false; 2],
            analog: HashMap::new(),
            digital: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn with_analog(mut self, input: AnalogInput, value: f32) -> Self {
        self.analog.insert(input, Script::constant(value));
        self
    }

    pub(crate) fn with_analog_sequence(mut self, input: AnalogInput, values: &[f32]) -> Self {
        self.analog.insert(input, Script::sequence(values));
        self
    }

    /// Scripts the three line sensors together, one (left, center, right)
    /// frame per read
    pub(crate) fn with_line_frames(self, frames: &[(f32, f32, f32)]) -> Self {
        let left: Vec<f32> = frames.iter().map(|f| f.0).collect();
        let center: Vec<f32> = frames.iter().map(|f| f.1).collect();
        let right: Vec<f32> = frames.iter().map(|f| f.2).collect();
        self.with_analog_sequence(AnalogInput::LineLeft, &left)
            .with_analog_sequence(AnalogInput::LineCenter, &center)
            .with_analog_sequence(AnalogInput::LineRight, &right)
    }

    pub(crate) fn with_digital_sequence(mut self, input: DigitalInput, values: &[bool]) -> Self {
        self.digital.insert(input, Script::sequence(values));
        self
    }

    /// The encoder on this side never counts
    pub(crate) fn stalled(mut self, side: Side) -> Self {
        self.stalled[index(side)] = true;
        self
    }

    pub(crate) fn elapsed(&self) -> Duration {
        Duration::from_micros(self.clock_us)
    }

    pub(crate) fn motor(&self, side: Side) -> f32 {
        self.motors[index(side)]
    }

    pub(crate) fn raw_counts(&self, side: Side) -> u32 {
        self.encoders[index(side)] as u32
    }

    /// Motor commands as (left, right) pairs, in the order they were issued
    pub(crate) fn drive_pairs(&self) -> Vec<(f32, f32)> {
        let motors: Vec<(Side, f32)> = self
            .events
            .iter()
            .filter_map(|e| match e {
                IoEvent::Motor(side, percent) => Some((*side, *percent)),
                _ => None,
            })
            .collect();
        motors
            .chunks(2)
            .map(|pair| match pair {
                [(Side::Left, l), (Side::Right, r)] => (*l, *r),
                other => panic!("motor commands not issued in left/right pairs: {:?}", other),
            })
            .collect()
    }

    /// Pairs that actually drive, i.e. without the stops
    pub(crate) fn moving_pairs(&self) -> Vec<(f32, f32)> {
        self.drive_pairs()
            .into_iter()
            .filter(|&(l, r)| l != 0.0 || r != 0.0)
            .collect()
    }

    pub(crate) fn servo_moves(&self) -> Vec<(ServoChannel, f32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                IoEvent::Servo(servo, degrees) => Some((*servo, *degrees)),
                _ => None,
            })
            .collect()
    }

    fn advance(&mut self, micros: u64) {
        self.clock_us += micros;
        let seconds = micros as f32 / 1_000_000.0;
        for i in 0..2 {
            if !self.stalled[i] {
                self.encoders[i] += self.motors[i].abs() * COUNTS_PER_PERCENT_SECOND * seconds;
            }
        }
    }
}

impl RobotIo for SimIo {
    fn set_motor_percent(&mut self, side: Side, percent: f32) {
        self.motors[index(side)] = percent;
        self.events.push(IoEvent::Motor(side, percent));
    }

    fn stop_motor(&mut self, side: Side) {
        self.set_motor_percent(side, 0.0);
    }

    fn encoder_counts(&mut self, side: Side) -> u32 {
        self.advance(POLL_PERIOD_US);
        self.raw_counts(side)
    }

    fn reset_encoder(&mut self, side: Side) {
        self.encoders[index(side)] = 0.0;
        self.events.push(IoEvent::ResetEncoder(side));
    }

    fn read_analog(&mut self, input: AnalogInput) -> f32 {
        self.advance(POLL_PERIOD_US);
        self.analog.get_mut(&input).map(Script::next).unwrap_or(0.0)
    }

    fn read_digital(&mut self, input: DigitalInput) -> bool {
        self.advance(POLL_PERIOD_US);
        self.digital.get_mut(&input).map(Script::next).unwrap_or(true)
    }

    fn set_servo_degrees(&mut self, servo: ServoChannel, degrees: f32) {
        self.events.push(IoEvent::Servo(servo, degrees));
    }

    fn sleep(&mut self, duration: Duration) {
        self.events.push(IoEvent::Sleep(duration));
        self.advance(duration.as_micros());
    }

    fn now(&mut self) -> Instant {
        Instant::from_micros(self.clock_us)
    }
}
