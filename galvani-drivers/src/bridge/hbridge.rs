//! H-bridge polarity stage
//!
//! Each channel has a pair of enable lines and a pair of direction lines.
//! Direction is always set before enable so the load never sees the
//! previous polarity.

use galvani_core::traits::Polarity;
use galvani_hal::OutputPin;

/// Pins of one channel's H-bridge
pub struct HBridge<P> {
    enable: [P; 2],
    direction: [P; 2],
}

impl<P: OutputPin> HBridge<P> {
    /// Take the pins and leave the bridge released
    pub fn new(enable: [P; 2], direction: [P; 2]) -> Self {
        let mut bridge = Self { enable, direction };
        bridge.release();
        bridge.set_direction(Polarity::Positive);
        bridge
    }

    /// Connect the load with the given polarity
    pub fn drive(&mut self, polarity: Polarity) {
        self.set_direction(polarity);
        for pin in &mut self.enable {
            pin.set_high();
        }
    }

    /// Disconnect the load
    pub fn release(&mut self) {
        for pin in &mut self.enable {
            pin.set_low();
        }
    }

    /// True while the load is connected
    pub fn is_driving(&self) -> bool {
        self.enable.iter().any(|pin| pin.is_set_high())
    }

    fn set_direction(&mut self, polarity: Polarity) {
        let high = polarity == Polarity::Negative;
        for pin in &mut self.direction {
            pin.set_state(high);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{log, MockPin, Trace};

    fn bridge(log: &crate::mock::Log) -> HBridge<MockPin> {
        HBridge::new(
            [MockPin::new("en_a", log), MockPin::new("en_b", log)],
            [MockPin::new("dir_a", log), MockPin::new("dir_b", log)],
        )
    }

    #[test]
    fn test_starts_released() {
        let log = log();
        let bridge = bridge(&log);
        assert!(!bridge.is_driving());
    }

    #[test]
    fn test_negative_sets_direction_before_enable() {
        let log = log();
        let mut bridge = bridge(&log);
        log.borrow_mut().clear();

        bridge.drive(Polarity::Negative);

        assert_eq!(
            *log.borrow(),
            [
                Trace::Pin("dir_a", true),
                Trace::Pin("dir_b", true),
                Trace::Pin("en_a", true),
                Trace::Pin("en_b", true),
            ]
        );
        assert!(bridge.is_driving());
    }

    #[test]
    fn test_positive_then_release() {
        let log = log();
        let mut bridge = bridge(&log);
        log.borrow_mut().clear();

        bridge.drive(Polarity::Positive);
        bridge.release();

        let trace = log.borrow();
        assert_eq!(trace[0], Trace::Pin("dir_a", false));
        assert_eq!(trace[1], Trace::Pin("dir_b", false));
        assert_eq!(trace[4], Trace::Pin("en_a", false));
        assert!(!bridge.is_driving());
    }
}
