//! Channel configuration
//!
//! Per-channel settings, the validated mutation boundary used by the
//! command layer, and the flat byte image persisted to flash.

pub mod image;
pub mod settings;
pub mod types;

pub use image::{ImageError, MAX_IMAGE_SIZE, RECORD_SIZE};
pub use settings::{ChannelSelect, ChannelSettings, SettingsError, MAX_CHANNELS};
pub use types::*;
