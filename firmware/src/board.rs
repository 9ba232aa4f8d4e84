//! Board binding
//!
//! Implements the robot's hardware capability on the RP2350B pins:
//! - Motors through a TB6612FNG, one PWM channel and two direction pins each
//! - Encoders as PWM slices in input mode counting rising edges
//! - CdS cell and optosensors on the ADC, read blocking
//! - Microswitches on pulled-up GPIO inputs
//! - Servos on 50 Hz PWM outputs
//!
//! Every capability call blocks; the run script executes in thread mode and
//! only the stop button runs beside it, on the interrupt executor.

use course_robot::{AnalogInput, DigitalInput, RobotIo, ServoChannel, Side};
use defmt::warn;
use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{self, InputMode, Pwm, SetDutyCycle};
use embassy_time::{block_for, Duration, Instant};
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

use crate::resources::{AnalogResources, MotorDriverResources, MotorEncoderResources, ServoResources, SwitchResources};

/// ADC reference voltage
const REF_VOLTAGE: f32 = 3.3;

/// ADC resolution (12-bit = 4096 steps)
const ADC_RANGE: f32 = 4096.0;

/// Motor PWM frequency; the IGWAN gearmotors run smoothly at 10 kHz
const MOTOR_PWM_HZ: u32 = 10_000;

/// Servo frame
const SERVO_PERIOD_US: u16 = 20_000;

/// Servo clock divider, keeps a 20 ms period under the 16-bit counter limit
const SERVO_DIVIDER: u8 = 64;

type DriveMotor = Motor<Output<'static>, Output<'static>, Pwm<'static>>;
type MotorDriver = Tb6612fng<
    Output<'static>,
    Output<'static>,
    Pwm<'static>,
    Output<'static>,
    Output<'static>,
    Pwm<'static>,
    Output<'static>,
>;

/// Edge counter on a PWM slice, widened to 32 bits
struct EncoderCounter {
    pwm: Pwm<'static>,
    last_raw: u16,
    total: u32,
}

impl EncoderCounter {
    fn new(pwm: Pwm<'static>) -> Self {
        pwm.set_counter(0);
        Self {
            pwm,
            last_raw: 0,
            total: 0,
        }
    }

    /// Edges since the last reset; the hardware counter wraps at 16 bits
    fn counts(&mut self) -> u32 {
        let raw = self.pwm.counter();
        self.total = self.total.wrapping_add(u32::from(raw.wrapping_sub(self.last_raw)));
        self.last_raw = raw;
        self.total
    }

    fn reset(&mut self) {
        self.pwm.set_counter(0);
        self.last_raw = 0;
        self.total = 0;
    }
}

/// Hobby servo on a 50 Hz PWM output
struct Servo {
    pwm: Pwm<'static>,
    min_pulse_us: f32,
    max_pulse_us: f32,
}

impl Servo {
    fn new(pwm: Pwm<'static>, min_pulse_us: f32, max_pulse_us: f32) -> Self {
        Self {
            pwm,
            min_pulse_us,
            max_pulse_us,
        }
    }

    /// Positions the horn, 0 to 180 degrees
    fn set_degrees(&mut self, degrees: f32) {
        let span = self.max_pulse_us - self.min_pulse_us;
        let pulse_us = self.min_pulse_us + span * degrees.clamp(0.0, 180.0) / 180.0;
        if self.pwm.set_duty_cycle_fraction(pulse_us as u16, SERVO_PERIOD_US).is_err() {
            warn!("servo pulse {} us rejected", pulse_us);
        }
    }
}

fn motor_pwm_config() -> pwm::Config {
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();

    // Minimum divider that keeps the period under the 16-bit limit
    let divider = ((clock_freq_hz / MOTOR_PWM_HZ) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (MOTOR_PWM_HZ * divider as u32)) as u16 - 1;

    let mut config = pwm::Config::default();
    config.divider = divider.into();
    config.top = period;
    config
}

fn servo_pwm_config() -> pwm::Config {
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();
    let frame_hz = 1_000_000 / u32::from(SERVO_PERIOD_US);

    let mut config = pwm::Config::default();
    config.divider = SERVO_DIVIDER.into();
    config.top = (clock_freq_hz / (frame_hz * u32::from(SERVO_DIVIDER))) as u16 - 1;
    config
}

/// Maps a signed percent onto a TB6612FNG command
fn drive_command(percent: f32) -> DriveCommand {
    let duty = libm::roundf(libm::fabsf(percent.clamp(-100.0, 100.0))) as u8;
    if duty == 0 {
        DriveCommand::Stop
    } else if percent > 0.0 {
        DriveCommand::Forward(duty)
    } else {
        DriveCommand::Backward(duty)
    }
}

/// All robot hardware behind the capability trait
pub struct Board {
    motors: MotorDriver,
    left_encoder: EncoderCounter,
    right_encoder: EncoderCounter,
    adc: Adc<'static, Blocking>,
    cds: Channel<'static>,
    line_left: Channel<'static>,
    line_center: Channel<'static>,
    line_right: Channel<'static>,
    front_left: Input<'static>,
    front_right: Input<'static>,
    back_left: Input<'static>,
    back_right: Input<'static>,
    arm: Servo,
    fork: Servo,
}

impl Board {
    pub fn new(
        motor_driver: MotorDriverResources,
        encoders: MotorEncoderResources,
        adc: Adc<'static, Blocking>,
        analog: AnalogResources,
        switches: SwitchResources,
        servos: ServoResources,
    ) -> Self {
        let pwm_config = motor_pwm_config();
        let stby = Output::new(motor_driver.standby_pin, Level::Low);

        // motor A, here defined to be the left motor
        let left_fwd = Output::new(motor_driver.left_forward_pin, Level::Low);
        let left_bckw = Output::new(motor_driver.left_backward_pin, Level::Low);
        let left_pwm = Pwm::new_output_a(motor_driver.left_slice, motor_driver.left_pwm_pin, pwm_config.clone());
        let left_motor: DriveMotor = Motor::new(left_fwd, left_bckw, left_pwm).unwrap();

        // motor B, here defined to be the right motor
        let right_fwd = Output::new(motor_driver.right_forward_pin, Level::Low);
        let right_bckw = Output::new(motor_driver.right_backward_pin, Level::Low);
        let right_pwm = Pwm::new_output_b(motor_driver.right_slice, motor_driver.right_pwm_pin, pwm_config);
        let right_motor: DriveMotor = Motor::new(right_fwd, right_bckw, right_pwm).unwrap();

        let mut motors = Tb6612fng::new(left_motor, right_motor, stby).unwrap();
        motors.disable_standby().unwrap();

        let encoder_config = pwm::Config::default();
        let left_encoder = Pwm::new_input(
            encoders.left_encoder_slice,
            encoders.left_encoder_pin,
            Pull::None,
            InputMode::RisingEdge,
            encoder_config.clone(),
        );
        let right_encoder = Pwm::new_input(
            encoders.right_encoder_slice,
            encoders.right_encoder_pin,
            Pull::None,
            InputMode::RisingEdge,
            encoder_config,
        );

        let servo_config = servo_pwm_config();
        // pulse range measured on the arm servo; the fork servo shares it
        let arm = Servo::new(
            Pwm::new_output_a(servos.arm_slice, servos.arm_pin, servo_config.clone()),
            500.0,
            2350.0,
        );
        let fork = Servo::new(
            Pwm::new_output_a(servos.fork_slice, servos.fork_pin, servo_config),
            500.0,
            2350.0,
        );

        Self {
            motors,
            left_encoder: EncoderCounter::new(left_encoder),
            right_encoder: EncoderCounter::new(right_encoder),
            adc,
            cds: Channel::new_pin(analog.cds_pin, Pull::None),
            line_left: Channel::new_pin(analog.line_left_pin, Pull::None),
            line_center: Channel::new_pin(analog.line_center_pin, Pull::None),
            line_right: Channel::new_pin(analog.line_right_pin, Pull::None),
            front_left: Input::new(switches.front_left_pin, Pull::Up),
            front_right: Input::new(switches.front_right_pin, Pull::Up),
            back_left: Input::new(switches.back_left_pin, Pull::Up),
            back_right: Input::new(switches.back_right_pin, Pull::Up),
            arm,
            fork,
        }
    }

    fn motor(&mut self, side: Side) -> &mut DriveMotor {
        match side {
            Side::Left => &mut self.motors.motor_a,
            Side::Right => &mut self.motors.motor_b,
        }
    }

    fn encoder(&mut self, side: Side) -> &mut EncoderCounter {
        match side {
            Side::Left => &mut self.left_encoder,
            Side::Right => &mut self.right_encoder,
        }
    }
}

impl RobotIo for Board {
    fn set_motor_percent(&mut self, side: Side, percent: f32) {
        if self.motor(side).drive(drive_command(percent)).is_err() {
            warn!("{:?} motor rejected {}%", side, percent);
        }
    }

    fn stop_motor(&mut self, side: Side) {
        if self.motor(side).drive(DriveCommand::Stop).is_err() {
            warn!("{:?} motor did not stop", side);
        }
    }

    fn encoder_counts(&mut self, side: Side) -> u32 {
        self.encoder(side).counts()
    }

    fn reset_encoder(&mut self, side: Side) {
        self.encoder(side).reset();
    }

    fn read_analog(&mut self, input: AnalogInput) -> f32 {
        let channel = match input {
            AnalogInput::Cds => &mut self.cds,
            AnalogInput::LineLeft => &mut self.line_left,
            AnalogInput::LineCenter => &mut self.line_center,
            AnalogInput::LineRight => &mut self.line_right,
        };
        match self.adc.blocking_read(channel) {
            Ok(raw) => f32::from(raw) * REF_VOLTAGE / ADC_RANGE,
            Err(_) => {
                warn!("ADC read of {:?} failed", input);
                0.0
            }
        }
    }

    fn read_digital(&mut self, input: DigitalInput) -> bool {
        let pin = match input {
            DigitalInput::FrontLeftSwitch => &self.front_left,
            DigitalInput::FrontRightSwitch => &self.front_right,
            DigitalInput::BackLeftSwitch => &self.back_left,
            DigitalInput::BackRightSwitch => &self.back_right,
        };
        pin.is_high()
    }

    fn set_servo_degrees(&mut self, servo: ServoChannel, degrees: f32) {
        match servo {
            ServoChannel::Arm => self.arm.set_degrees(degrees),
            ServoChannel::Fork => self.fork.set_degrees(degrees),
        }
    }

    fn sleep(&mut self, duration: Duration) {
        block_for(duration);
    }

    fn now(&mut self) -> Instant {
        Instant::now()
    }
}
