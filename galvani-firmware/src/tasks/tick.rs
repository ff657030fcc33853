//! Tick task
//!
//! Advances the shared 100 µs tick clock. Runs on the interrupt executor,
//! so the count keeps moving while the main loop busy-waits inside a pulse.

use defmt::*;
use embassy_time::{Duration, Ticker};
use galvani_core::traits::{TickCounter, TICK_PERIOD_US};

/// Shared tick clock read by the waveform engine
pub static TICKS: TickCounter = TickCounter::new();

/// Tick task - one increment per tick period
#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started");

    TICKS.reset();
    let mut ticker = Ticker::every(Duration::from_micros(u64::from(TICK_PERIOD_US)));

    loop {
        ticker.next().await;
        TICKS.increment();
    }
}
