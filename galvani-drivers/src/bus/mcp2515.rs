//! MCP2515 auxiliary controller
//!
//! Only used as a clock source: after reset the CLKOUT pin is enabled
//! with a divide-by-one prescaler. No CAN traffic is handled.

use galvani_hal::{OutputPin, SpiBus};

const INSTR_RESET: u8 = 0xC0;
const INSTR_WRITE: u8 = 0x02;

const REG_CANCTRL: u8 = 0x0F;

/// REQOP = configuration mode, CLKEN = 1, CLKPRE = /1
const CANCTRL_CLKOUT: u8 = 0x84;

/// MCP2515 on a shared SPI bus
pub struct Mcp2515<P> {
    cs: P,
}

impl<P: OutputPin> Mcp2515<P> {
    /// Take ownership of the chip select and deselect the chip
    pub fn new(mut cs: P) -> Self {
        cs.set_high();
        Self { cs }
    }

    /// Soft reset
    ///
    /// The oscillator needs 128 cycles after reset before the next command.
    pub fn reset<S: SpiBus>(&mut self, spi: &mut S) -> Result<(), S::Error> {
        self.transaction(spi, &[INSTR_RESET])
    }

    /// Enable the clock output
    pub fn enable_clock_out<S: SpiBus>(&mut self, spi: &mut S) -> Result<(), S::Error> {
        self.write_register(spi, REG_CANCTRL, CANCTRL_CLKOUT)
    }

    /// Write one register
    pub fn write_register<S: SpiBus>(
        &mut self,
        spi: &mut S,
        register: u8,
        value: u8,
    ) -> Result<(), S::Error> {
        self.transaction(spi, &[INSTR_WRITE, register, value])
    }

    /// Release the chip select pin
    pub fn release(self) -> P {
        self.cs
    }

    fn transaction<S: SpiBus>(&mut self, spi: &mut S, frame: &[u8]) -> Result<(), S::Error> {
        self.cs.set_low();
        let result = spi.write(frame);
        self.cs.set_high();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{log, MockPin, MockSpi, Trace};
    use std::vec;

    #[test]
    fn test_clock_out_sequence() {
        let log = log();
        let mut spi = MockSpi::new(&log);
        let mut mcp = Mcp2515::new(MockPin::new("cs", &log));

        mcp.reset(&mut spi).unwrap();
        mcp.enable_clock_out(&mut spi).unwrap();

        let frames: std::vec::Vec<_> = log
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::Spi(bytes) => Some(bytes.clone()),
                Trace::Pin(..) => None,
            })
            .collect();
        assert_eq!(frames, vec![vec![0xC0], vec![0x02, 0x0F, 0x84]]);
    }

    #[test]
    fn test_each_frame_has_own_select() {
        let log = log();
        let mut spi = MockSpi::new(&log);
        let mut mcp = Mcp2515::new(MockPin::new("cs", &log));
        log.borrow_mut().clear();

        mcp.reset(&mut spi).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Trace::Pin("cs", false),
                Trace::Spi(vec![0xC0]),
                Trace::Pin("cs", true),
            ]
        );
    }
}
