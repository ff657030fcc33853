//! Persisted settings image
//!
//! One fixed 21-byte record per channel, concatenated in channel order:
//!
//! ```text
//! offset  size  field
//! 0       1     run_state
//! 1       1     voltage.positive
//! 2       1     voltage.negative
//! 3       10    times[5]   (u16 LE each)
//! 13      6     delta[3]   (u16 LE each)
//! 19      2     pulse_limit (u16 LE)
//! ```
//!
//! Reordering fields breaks images already written to flash.

use heapless::Vec;

use super::settings::{ChannelSettings, MAX_CHANNELS};
use super::types::{ChannelSetting, PhaseTimes, RampDelta, RunState, Voltage};

/// Size of one channel record in bytes
pub const RECORD_SIZE: usize = 21;

/// Size of the largest image (all supported channels)
pub const MAX_IMAGE_SIZE: usize = RECORD_SIZE * MAX_CHANNELS;

/// Image decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Image length is not `N × RECORD_SIZE`
    LengthMismatch {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },
    /// A record holds a voltage or ramp value the mutation boundary rejects
    OutOfBounds {
        /// Offending channel
        channel: usize,
    },
}

impl ChannelSetting {
    /// Encode into one record
    pub fn encode(&self, out: &mut [u8; RECORD_SIZE]) {
        out[0] = self.run_state.as_raw();
        out[1] = self.voltage.positive;
        out[2] = self.voltage.negative;

        let words = self
            .times
            .as_array()
            .into_iter()
            .chain(self.delta.as_array())
            .chain([self.pulse_limit]);
        for (chunk, word) in out[3..].chunks_exact_mut(2).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
    }

    /// Decode one record, without bounds checks
    pub fn decode(record: &[u8; RECORD_SIZE]) -> Self {
        let mut words = [0u16; 9];
        for (word, chunk) in words.iter_mut().zip(record[3..].chunks_exact(2)) {
            *word = u16::from_le_bytes([chunk[0], chunk[1]]);
        }

        Self {
            run_state: RunState::from_raw(record[0]),
            voltage: Voltage {
                positive: record[1],
                negative: record[2],
            },
            times: PhaseTimes::from_array([words[0], words[1], words[2], words[3], words[4]]),
            delta: RampDelta::from_array([words[5], words[6], words[7]]),
            pulse_limit: words[8],
        }
    }
}

impl<const N: usize> ChannelSettings<N> {
    /// Length of the image for this channel count
    pub const IMAGE_SIZE: usize = RECORD_SIZE * N;

    /// Serialize all channels to the persisted layout
    pub fn to_image(&self) -> Vec<u8, MAX_IMAGE_SIZE> {
        let mut image = Vec::new();
        let mut record = [0u8; RECORD_SIZE];
        for setting in self.iter() {
            setting.encode(&mut record);
            // N <= MAX_CHANNELS, so the image always fits
            let _ = image.extend_from_slice(&record);
        }
        image
    }

    /// Rebuild settings from a persisted image
    ///
    /// Rejects the whole image if the length is wrong or any record violates
    /// the voltage/ramp bounds; the caller falls back to compiled defaults.
    pub fn from_image(image: &[u8]) -> Result<Self, ImageError> {
        if image.len() != Self::IMAGE_SIZE {
            return Err(ImageError::LengthMismatch {
                expected: Self::IMAGE_SIZE,
                actual: image.len(),
            });
        }

        let mut channels = [ChannelSetting::default(); N];
        for (channel, (slot, chunk)) in channels
            .iter_mut()
            .zip(image.chunks_exact(RECORD_SIZE))
            .enumerate()
        {
            let mut record = [0u8; RECORD_SIZE];
            record.copy_from_slice(chunk);
            let setting = ChannelSetting::decode(&record);
            if !setting.is_valid() {
                return Err(ImageError::OutOfBounds { channel });
            }
            *slot = setting;
        }

        Ok(Self::new(channels))
    }
}
