//! RP2040-specific HAL for the stimulator firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `galvani-hal` traits and the `galvani-core` delay trait:
//!
//! - Output pins for H-bridge lines and chip selects
//! - Blocking SPI for the digipot and auxiliary bus controller
//! - Polled access to the interrupt-buffered terminal UART
//! - Busy-wait 100 µs delay
//! - Flash storage driver (implements `galvani_hal::FlashStorage`)

#![no_std]

pub mod delay;
pub mod flash;
pub mod gpio;
pub mod spi;
pub mod uart;

// Re-export shared traits from galvani-hal for convenience
pub use galvani_hal::{FlashStorage as FlashStorageTrait, StorageKey};
