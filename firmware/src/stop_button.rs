//! Emergency stop button
//!
//! Runs on the high-priority interrupt executor so it is serviced while the
//! run script busy-polls in thread mode. A debounced press raises the
//! cancellation token; the running operation stops its motors at its next
//! poll and every later operation returns immediately.

use course_robot::CancelToken;
use defmt::warn;
use embassy_rp::gpio::{Input, Level, Pull};
use embassy_time::{Duration, Timer};

use crate::resources::StopButtonResources;

/// Button debounce delay (ms)
const DEBOUNCE_DURATION: Duration = Duration::from_millis(30);

#[embassy_executor::task]
pub async fn stop_button(r: StopButtonResources, cancel: &'static CancelToken) {
    let mut btn = Input::new(r.btn, Pull::Down);
    loop {
        if debounce(&mut btn).await == Level::High {
            warn!("stop button pressed");
            cancel.cancel();
        }
    }
}

/// Ensures stable button state
async fn debounce(button: &mut Input<'static>) -> Level {
    loop {
        let st_level = button.get_level();
        button.wait_for_any_edge().await;
        Timer::after(DEBOUNCE_DURATION).await;
        let end_level = button.get_level();
        if st_level != end_level {
            break end_level;
        }
    }
}
