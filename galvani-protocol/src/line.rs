//! Line editor for the serial console
//!
//! Collects typed bytes into one command line. The editor only decides what
//! happens to each byte; the terminal performs the echo.

use heapless::Vec;

/// Longest accepted command line
pub const MAX_LINE_LENGTH: usize = 64;

/// Backspace
pub const BS: u8 = 0x08;
/// Terminal bell
pub const BELL: u8 = 0x07;
/// Carriage return, ends a line
pub const CR: u8 = 0x0D;

const DEL: u8 = 0x7F;

/// Outcome of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent {
    /// Byte accepted; echo it back
    Echo(u8),
    /// Last character removed; echo BS, space, BS
    Erase,
    /// Nothing to erase or line full; ring the bell
    Bell,
    /// Line terminated
    Complete,
    /// Byte dropped without feedback
    Ignored,
}

/// Command line buffer
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: Vec<u8, MAX_LINE_LENGTH>,
}

impl LineEditor {
    /// Create an empty editor
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one received byte
    pub fn feed(&mut self, byte: u8) -> LineEvent {
        match byte {
            CR => LineEvent::Complete,
            BS | DEL => {
                if self.buffer.pop().is_some() {
                    LineEvent::Erase
                } else {
                    LineEvent::Bell
                }
            }
            b if b.is_ascii_graphic() || b == b' ' || b == b'\t' => {
                if self.buffer.push(b.to_ascii_uppercase()).is_ok() {
                    LineEvent::Echo(b)
                } else {
                    LineEvent::Bell
                }
            }
            _ => LineEvent::Ignored,
        }
    }

    /// The collected line, upper-cased
    pub fn line(&self) -> &str {
        // only printable ASCII is ever stored
        core::str::from_utf8(&self.buffer).unwrap_or("")
    }

    /// Number of buffered characters
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when nothing has been typed
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard the line
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
