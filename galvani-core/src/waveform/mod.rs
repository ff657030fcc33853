//! Per-channel waveform generation
//!
//! Each channel runs a small state machine that turns its
//! [`ChannelSetting`](crate::config::ChannelSetting) into a train of bipolar
//! pulses, with an optional sawtooth frequency ramp.

pub mod engine;
pub mod events;
pub mod ramp;
pub mod state;

pub use engine::WaveformEngine;
pub use events::EngineEvent;
pub use state::{ChannelRuntime, WaveState};
