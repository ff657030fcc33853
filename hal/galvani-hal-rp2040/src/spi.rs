//! Blocking SPI master
//!
//! Adapts any `embedded-hal` 1.0 bus (embassy-rp's blocking `Spi` in the
//! firmware) to the `galvani-hal` bus trait. Writes are flushed before
//! returning so the caller can raise chip select right after.

use embedded_hal::spi::SpiBus as EhSpiBus;
use galvani_hal::SpiBus;

/// SPI bus wrapper
pub struct Rp2040Spi<B> {
    bus: B,
}

impl<B: EhSpiBus<u8>> Rp2040Spi<B> {
    /// Wrap a configured bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: EhSpiBus<u8>> SpiBus for Rp2040Spi<B> {
    type Error = B::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(data)?;
        self.bus.flush()
    }
}
