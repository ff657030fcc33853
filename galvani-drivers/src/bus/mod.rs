//! Auxiliary bus peripherals

pub mod mcp2515;

pub use mcp2515::Mcp2515;
