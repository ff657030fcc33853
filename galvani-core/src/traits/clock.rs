//! Tick clock and micro-delay traits
//!
//! The tick clock is a 16-bit counter advanced by a periodic interrupt. It
//! wraps roughly every 6.5 s at the 100 µs tick rate, so every timing
//! decision goes through [`Tick::elapsed_since`], never plain subtraction.

use core::cell::Cell;
use critical_section::Mutex;

/// Tick period of the monotonic clock in microseconds
///
/// Matches the unit of every [`PhaseTimes`](crate::config::PhaseTimes) field.
pub const TICK_PERIOD_US: u32 = 100;

/// Snapshot of the 16-bit monotonic tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick(pub u16);

impl Tick {
    /// Forward distance from `earlier` to `self` on the circular 16-bit clock
    ///
    /// Equals `now - ref` when `now >= ref`, otherwise `now + (65536 - ref)`.
    pub const fn elapsed_since(self, earlier: Tick) -> u16 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Raw counter value
    pub const fn ticks(self) -> u16 {
        self.0
    }
}

/// Monotonic tick source
pub trait TickClock {
    /// Take an atomic snapshot of the counter
    fn now(&self) -> Tick;
}

impl<T: TickClock + ?Sized> TickClock for &T {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

/// Busy-wait delay in 100 µs units
///
/// Implementations must use a timing source independent of the tick clock,
/// must not be optimized away, and cannot be interrupted or cancelled.
/// `count == 0` returns immediately.
pub trait MicroDelay {
    /// Spin for `count × 100 µs`
    fn delay_100us(&mut self, count: u16);
}

/// Tick counter shared between the tick interrupt and the main loop
///
/// The interrupt context is the only writer ([`increment`](Self::increment));
/// readers take a critical-section snapshot so a read never observes a torn
/// update.
pub struct TickCounter {
    count: Mutex<Cell<u16>>,
}

impl TickCounter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Advance the counter by one tick, wrapping at 65536
    pub fn increment(&self) {
        critical_section::with(|cs| {
            let count = self.count.borrow(cs);
            count.set(count.get().wrapping_add(1));
        });
    }

    /// Reset the counter to zero (clock initialization)
    pub fn reset(&self) {
        critical_section::with(|cs| self.count.borrow(cs).set(0));
    }

    /// Atomic snapshot of the counter
    pub fn read(&self) -> Tick {
        critical_section::with(|cs| Tick(self.count.borrow(cs).get()))
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock for TickCounter {
    fn now(&self) -> Tick {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference form of the rollover rule, written out with the branch
    fn reference_elapsed(now: u16, reference: u16) -> u32 {
        if now >= reference {
            (now - reference) as u32
        } else {
            now as u32 + (65536 - reference as u32)
        }
    }

    #[test]
    fn test_elapsed_without_wrap() {
        assert_eq!(Tick(1500).elapsed_since(Tick(1000)), 500);
        assert_eq!(Tick(7).elapsed_since(Tick(7)), 0);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(Tick(10).elapsed_since(Tick(65530)), 16);
        assert_eq!(Tick(0).elapsed_since(Tick(65535)), 1);
        assert_eq!(Tick(65535).elapsed_since(Tick(0)), 65535);
    }

    #[test]
    fn test_counter_wraps() {
        let counter = TickCounter::new();
        for _ in 0..65535 {
            counter.increment();
        }
        assert_eq!(counter.now(), Tick(65535));
        counter.increment();
        assert_eq!(counter.now(), Tick(0));
    }

    #[test]
    fn test_counter_reset() {
        let counter = TickCounter::default();
        counter.increment();
        counter.increment();
        assert_eq!(counter.read().ticks(), 2);
        counter.reset();
        assert_eq!(counter.read().ticks(), 0);
    }

    #[test]
    fn test_clock_through_reference() {
        let counter = TickCounter::new();
        counter.increment();
        let clock = &counter;
        assert_eq!(clock.now(), Tick(1));
    }

    proptest! {
        #[test]
        fn prop_elapsed_matches_circular_distance(now in any::<u16>(), reference in any::<u16>()) {
            let elapsed = Tick(now).elapsed_since(Tick(reference));
            prop_assert_eq!(elapsed as u32, reference_elapsed(now, reference) % 65536);
            // Walking forward `elapsed` ticks from the reference lands on `now`
            prop_assert_eq!(reference.wrapping_add(elapsed), now);
        }
    }
}
