//! Galvani Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the stimulator drivers and
//! firmware are written against. Chip-specific crates implement them, so the
//! pulse stage drivers can be exercised on the host with fake pins and buses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  galvani-firmware / galvani-drivers     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  galvani-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ galvani-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - H-bridge enable/direction lines, chip selects
//! - [`spi::SpiBus`] - digipot and auxiliary controller bus
//! - [`uart::UartTx`], [`uart::UartRx`] - operator terminal
//! - [`flash::FlashStorage`] - persisted channel settings

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod spi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::OutputPin;
pub use spi::SpiBus;
pub use uart::{UartRx, UartTx};
