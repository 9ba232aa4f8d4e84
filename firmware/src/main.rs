//! Course robot firmware entry point
//!
//! Binds the course-robot core to the RP2350B board, checks the battery and
//! runs the course script. The script blocks the thread-mode executor for
//! the whole run; the stop button runs on an interrupt executor at higher
//! priority so it can still cancel a move in progress.

#![no_std]
#![no_main]

use course_robot::{CancelToken, Robot, RobotConfig};
use defmt::{error, info};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{self, Adc};
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::Timer;
use resources::{
    AdcResources, AnalogResources, AssignedResources, BatteryChargeResources, MotorDriverResources,
    MotorEncoderResources, ServoResources, StopButtonResources, SwitchResources,
};
use {defmt_rtt as _, panic_probe as _};

use crate::board::Board;
use crate::stop_button::stop_button;

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Board binding of the hardware capability
mod board;
/// Pre-run battery check
mod battery;
/// Pin allocation
mod resources;
/// Emergency stop
mod stop_button;

/// Raised by the stop button, observed by every blocking operation
static CANCEL: CancelToken = CancelToken::new();

/// Executor for tasks that must preempt the run script
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// The course: start light, then the scored tasks in order
fn run_course(robot: &mut Robot<'_, Board>) -> course_robot::Result<()> {
    info!("waiting for start light");
    robot.wait_for_start()?;

    robot.burger()?;
    info!("burger done");

    Ok(())
}

/// Firmware entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(stop_button(r.stop_button, &CANCEL)).unwrap();

    let mut adc = Adc::new_blocking(r.adc.adc, adc::Config::default());
    let battery = battery::check(&mut adc, r.battery_charge);
    if !battery.sufficient {
        error!("refusing to run on {} V", battery.volts);
        return;
    }

    let board = Board::new(r.motor_driver, r.motor_encoders, adc, r.analog, r.switches, r.servos);
    let mut robot = match Robot::new(board, RobotConfig::default(), &CANCEL) {
        Ok(robot) => robot,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return;
        }
    };

    match run_course(&mut robot) {
        Ok(()) => info!("Done."),
        Err(e) => error!("run aborted: {}", e),
    }

    // keep the motors stopped until power off
    let _board = robot.into_io();
    loop {
        Timer::after_secs(60).await;
    }
}
