//! Pre-run battery check
//!
//! Reads the pack voltage before the run so a flat battery is reported
//! instead of showing up as short moves.
//!
//! # Voltage Calculations
//! ```text
//! Battery Voltage = (ADC Value * 3.3V * 3.0) / 4096
//! Where:
//! - 3.3V is ADC reference voltage
//! - 3.0 is voltage divider ratio
//! - 4096 is ADC resolution (12-bit)
//! ```
//! Samples are median filtered so a single motor-noise spike cannot fail the
//! check.

use defmt::{info, warn};
use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::gpio::Pull;
use embassy_time::{block_for, Duration};
use moving_median::MovingMedian;

use crate::resources::BatteryChargeResources;

/// Lowest voltage at which the motors still reach their calibrated speeds
const BATTERY_VOLTAGE_LOWER: f32 = 7.0;

/// ADC reference voltage
const REF_VOLTAGE: f32 = 3.3;

/// Hardware voltage divider ratio (3:1 scales battery voltage to ADC range)
const V_DIVIDER_RATIO: f32 = 3.0;

/// ADC resolution (12-bit = 4096 steps)
const ADC_RANGE: f32 = 4096.0;

/// Median filter window
const MEDIAN_WINDOW_SIZE: usize = 9;

/// Gap between two samples
const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Median battery voltage and whether it is high enough for a run
pub struct BatteryReport {
    pub volts: f32,
    pub sufficient: bool,
}

/// Samples the pack voltage and logs the result
pub fn check(adc: &mut Adc<'static, Blocking>, r: BatteryChargeResources) -> BatteryReport {
    let mut channel = Channel::new_pin(r.vsys_pin, Pull::None);
    let mut median_filter = MovingMedian::<f32, MEDIAN_WINDOW_SIZE>::new();

    for _ in 0..MEDIAN_WINDOW_SIZE {
        let raw = adc.blocking_read(&mut channel).unwrap_or(0);
        median_filter.add_value(f32::from(raw) * REF_VOLTAGE * V_DIVIDER_RATIO / ADC_RANGE);
        block_for(SAMPLE_INTERVAL);
    }

    let volts = median_filter.median();
    let sufficient = volts >= BATTERY_VOLTAGE_LOWER;
    if sufficient {
        info!("battery at {} V", volts);
    } else {
        warn!("battery low: {} V, moves will fall short", volts);
    }

    BatteryReport { volts, sufficient }
}
