//! Terminal UART
//!
//! The interrupt-driven rings of embassy-rp's `BufferedUart` are accessed
//! from the main loop without ever waiting for the line: `read_ready`
//! guards every read and `write_ready` every write.

use embedded_io::{Read, ReadReady, Write, WriteReady};
use galvani_hal::{UartRx, UartTx};

/// Polled UART wrapper
pub struct Rp2040Uart<T> {
    inner: T,
    overruns: u32,
}

impl<T> Rp2040Uart<T> {
    /// Wrap a buffered UART
    pub fn new(inner: T) -> Self {
        Self { inner, overruns: 0 }
    }
}

impl<T: Write + WriteReady> UartTx for Rp2040Uart<T> {
    type Error = T::Error;

    fn try_write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        let mut queued = 0;
        while queued < data.len() && self.inner.write_ready()? {
            // with room in the ring, write returns without blocking
            match self.inner.write(&data[queued..])? {
                0 => break,
                n => queued += n,
            }
        }
        Ok(queued)
    }
}

impl<T: Read + ReadReady> UartRx for Rp2040Uart<T> {
    type Error = T::Error;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let ready = self.inner.read_ready().inspect_err(|_| self.count_overrun())?;
        if !ready {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) => {
                self.count_overrun();
                Err(e)
            }
        }
    }

    fn overrun_count(&self) -> u32 {
        self.overruns
    }
}

impl<T> Rp2040Uart<T> {
    fn count_overrun(&mut self) {
        self.overruns = self.overruns.saturating_add(1);
    }
}
