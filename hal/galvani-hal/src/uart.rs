//! UART serial communication abstractions
//!
//! The operator terminal is polled from the cooperative main loop, so both
//! directions are non-blocking: receive hands back whatever the
//! interrupt-driven ring buffer already holds, transmit queues only what
//! fits in the ring. Neither ever waits for the line.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Queue as much of `data` as the transmit buffer has room for
    ///
    /// Never waits for the line. Returns the number of bytes queued; the
    /// caller decides what to do with the rest.
    fn try_write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take one byte from the receive buffer if one is available
    ///
    /// Returns `Ok(None)` when the buffer is empty.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Number of receive overruns seen since start-up
    ///
    /// Overruns are counted, never escalated.
    fn overrun_count(&self) -> u32 {
        0
    }
}
