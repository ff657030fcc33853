//! Output polarity switching

pub mod hbridge;

pub use hbridge::HBridge;
