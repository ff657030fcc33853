//! MCP42100 dual digital potentiometer
//!
//! Used as a two-output amplitude DAC. Each write is a 16-bit frame: a
//! command byte selecting the wiper(s), then the wiper position.
//!
//! ```text
//! CS ‾‾\____________________/‾‾
//!        [cmd 0x11..0x13][wiper]
//! ```

use galvani_hal::{OutputPin, SpiBus};

/// Wiper counts per amplitude unit (level 50 = wiper 250)
pub const LEVEL_SCALE: u8 = 5;

const CMD_WRITE_POT0: u8 = 0x11;
const CMD_WRITE_POT1: u8 = 0x12;
const CMD_WRITE_BOTH: u8 = 0x13;

/// Wiper selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pot {
    /// Potentiometer 0
    Pot0,
    /// Potentiometer 1
    Pot1,
    /// Both wipers in one frame
    Both,
}

impl Pot {
    fn command(self) -> u8 {
        match self {
            Pot::Pot0 => CMD_WRITE_POT0,
            Pot::Pot1 => CMD_WRITE_POT1,
            Pot::Both => CMD_WRITE_BOTH,
        }
    }
}

/// One MCP42100 on a shared SPI bus
pub struct Mcp42100<P> {
    cs: P,
}

impl<P: OutputPin> Mcp42100<P> {
    /// Take ownership of the chip select and deselect the chip
    pub fn new(mut cs: P) -> Self {
        cs.set_high();
        Self { cs }
    }

    /// Write a raw wiper position
    pub fn write_wiper<S: SpiBus>(
        &mut self,
        spi: &mut S,
        pot: Pot,
        wiper: u8,
    ) -> Result<(), S::Error> {
        self.cs.set_low();
        let result = spi.write(&[pot.command(), wiper]);
        self.cs.set_high();
        result
    }

    /// Write an amplitude level, scaled to the wiper range
    pub fn write_level<S: SpiBus>(
        &mut self,
        spi: &mut S,
        pot: Pot,
        level: u8,
    ) -> Result<(), S::Error> {
        self.write_wiper(spi, pot, level_to_wiper(level))
    }

    /// Release the chip select pin
    pub fn release(self) -> P {
        self.cs
    }
}

/// Amplitude units to wiper position, saturating at full scale
pub fn level_to_wiper(level: u8) -> u8 {
    level.saturating_mul(LEVEL_SCALE)
}
