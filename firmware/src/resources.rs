//! Hardware Resource Allocation
//!
//! Splits the RP2350B peripherals into one group per consumer so each piece of
//! hardware has exactly one owner.
//!
//! # Resource Groups
//! - Motor Driver: TB6612FNG standby, direction and PWM pins for both IGWAN motors
//! - Motor Encoders: PWM slices counting rising edges of the shaft encoders
//! - ADC: the converter itself, used by the battery check and then the board
//! - Analog: the CdS cell and the three line optosensors
//! - Battery Charge: VSYS divider input
//! - Switches: the four bumper microswitches
//! - Servos: ticket arm and burger fork
//! - Stop Button: emergency stop, handled at interrupt priority

use assign_resources::assign_resources;
use embassy_rp::peripherals;

assign_resources! {
    /// TB6612FNG dual motor driver pins and PWM channels
    motor_driver: MotorDriverResources {
        standby_pin: PIN_22,
        left_slice: PWM_SLICE6,
        left_pwm_pin: PIN_28,
        left_forward_pin: PIN_21,
        left_backward_pin: PIN_20,
        right_slice: PWM_SLICE5,
        right_pwm_pin: PIN_27,
        right_forward_pin: PIN_19,
        right_backward_pin: PIN_18,
    },
    /// Shaft encoder edge counters, channel B of each slice
    motor_encoders: MotorEncoderResources {
        left_encoder_slice: PWM_SLICE3,
        left_encoder_pin: PIN_7,
        right_encoder_slice: PWM_SLICE4,
        right_encoder_pin: PIN_9,
    },
    /// ADC, shared by the battery check and the board
    adc: AdcResources {
        adc: ADC,
    },
    /// CdS cell and line optosensors
    analog: AnalogResources {
        cds_pin: PIN_40,
        line_left_pin: PIN_41,
        line_center_pin: PIN_42,
        line_right_pin: PIN_43,
    },
    /// Battery voltage monitoring pin (3:1 divider)
    battery_charge: BatteryChargeResources {
        vsys_pin: PIN_44,
    },
    /// Bumper microswitches, closed to ground when pressed
    switches: SwitchResources {
        front_left_pin: PIN_10,
        front_right_pin: PIN_11,
        back_left_pin: PIN_12,
        back_right_pin: PIN_13,
    },
    /// Servo attachments, channel A of each slice
    servos: ServoResources {
        arm_slice: PWM_SLICE0,
        arm_pin: PIN_0,
        fork_slice: PWM_SLICE1,
        fork_pin: PIN_2,
    },
    /// Emergency stop push button
    stop_button: StopButtonResources {
        btn: PIN_16,
    },
}
