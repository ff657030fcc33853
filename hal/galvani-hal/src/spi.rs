//! SPI bus abstractions
//!
//! The stimulator only ever writes to its SPI peripherals (digipot,
//! auxiliary bus controller). Chip select is handled by the device
//! drivers, not the bus.

/// SPI bus master, mode 0
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Write a frame, discarding whatever is clocked in
    ///
    /// Returns only after the last bit has left the shift register, so the
    /// caller may deselect the device right away.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}
