//! Peripheral drivers
//!
//! Concrete implementations of the actuation side of galvani-core, written
//! against the galvani-hal pin and bus traits:
//!
//! - MCP42100 dual digital potentiometer used as the amplitude DAC
//! - H-bridge polarity stage
//! - MCP2515 auxiliary controller (clock output only)
//! - [`PulseStage`], tying the DAC and bridges into a `PulseOutput`

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod amplitude;
pub mod bridge;
pub mod bus;
pub mod stage;

pub use stage::PulseStage;

#[cfg(test)]
pub(crate) mod mock;
