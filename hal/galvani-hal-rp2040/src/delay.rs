//! Busy-wait delay
//!
//! Spins on the embassy time driver. The tick interrupt keeps running
//! during the wait, so the shared tick clock advances across a pulse.

use embassy_time::{block_for, Duration};
use galvani_core::traits::{MicroDelay, TICK_PERIOD_US};

/// Blocking delay in 100 µs units
#[derive(Debug, Default, Clone, Copy)]
pub struct HardwareDelay;

impl MicroDelay for HardwareDelay {
    fn delay_100us(&mut self, count: u16) {
        if count == 0 {
            return;
        }
        block_for(Duration::from_micros(
            u64::from(count) * u64::from(TICK_PERIOD_US),
        ));
    }
}
