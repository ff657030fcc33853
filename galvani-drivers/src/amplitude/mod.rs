//! Amplitude DAC

pub mod mcp42100;

pub use mcp42100::{Mcp42100, Pot, LEVEL_SCALE};
