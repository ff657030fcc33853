//! Board configuration
//!
//! Compile-time constants for the two-channel Pico stimulator board. Pin
//! numbers are listed here for reference; `main` takes the matching
//! peripherals.
//!
//! | Function            | GPIO            |
//! |---------------------|-----------------|
//! | Terminal UART0 TX/RX| 0 / 1           |
//! | CH0 enable A/B      | 2 / 3           |
//! | CH0 direction A/B   | 4 / 5           |
//! | CH1 enable A/B      | 6 / 7           |
//! | CH1 direction A/B   | 8 / 9           |
//! | SPI0 MISO           | 16              |
//! | MCP42100 CS         | 17              |
//! | SPI0 SCK / MOSI     | 18 / 19         |
//! | MCP2515 CS          | 20              |

/// Stimulation channels on this board
pub const CHANNEL_COUNT: usize = 2;

/// Terminal baud rate
pub const TERMINAL_BAUD: u32 = 115_200;

/// Terminal UART ring buffer sizes
///
/// The transmit ring holds the longest reply (help listing) in one go;
/// terminal output beyond it is dropped, not waited on.
pub const UART_TX_BUFFER: usize = 1024;
pub const UART_RX_BUFFER: usize = 64;

/// SPI clock for the digipot and the MCP2515
pub const SPI_FREQUENCY: u32 = 1_000_000;
