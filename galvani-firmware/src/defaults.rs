//! Power-on channel defaults, generated from channels.toml

use galvani_core::config::{
    ChannelSetting, ChannelSettings, PhaseTimes, RampDelta, RunState, Voltage,
};

use crate::board::CHANNEL_COUNT;

include!(concat!(env!("OUT_DIR"), "/channel_defaults.rs"));

// channels.toml must describe every channel of the board
const _: () = assert!(CHANNEL_DEFAULTS.len() == CHANNEL_COUNT);

/// Settings used when flash holds no usable image
pub fn channel_defaults() -> ChannelSettings<CHANNEL_COUNT> {
    let mut channels = [ChannelSetting::default(); CHANNEL_COUNT];
    for (slot, default) in channels.iter_mut().zip(CHANNEL_DEFAULTS.iter()) {
        *slot = *default;
    }
    ChannelSettings::new(channels)
}
