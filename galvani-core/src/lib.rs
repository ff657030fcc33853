//! Board-agnostic core logic for the stimulator firmware
//!
//! This crate contains everything that decides *when* and *how* a pulse is
//! delivered, without touching hardware:
//!
//! - Hardware abstraction traits (tick clock, micro-delay, pulse output)
//! - Channel settings with validated mutation and the persisted byte image
//! - Per-channel waveform state machine and frequency ramp
//! - Cooperative scheduler tying the command interpreter to the engine

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod scheduler;
pub mod traits;
pub mod waveform;
