//! Channel settings store
//!
//! Owned, index-addressed collection of [`ChannelSetting`]s. The public
//! mutators are the validation boundary for the command layer: they either
//! apply a change completely or reject it without touching any state.

use super::types::{ChannelSetting, PhaseTimes, RampDelta, RunState, Voltage};

/// Largest channel count any board variant uses
pub const MAX_CHANNELS: usize = 4;

/// Errors from the mutation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Amplitude or ramp limit violated
    ParameterOutOfBounds,
    /// Channel index does not exist on this board
    NoSuchChannel,
}

/// Target of a start/stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelSelect {
    /// A single channel by index
    One(usize),
    /// Every channel
    All,
}

/// Settings for all `N` channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings<const N: usize> {
    channels: [ChannelSetting; N],
}

impl<const N: usize> ChannelSettings<N> {
    const CAPACITY_OK: () = assert!(N >= 1 && N <= MAX_CHANNELS, "unsupported channel count");

    /// Create from an explicit table (compiled defaults or a decoded image)
    pub const fn new(channels: [ChannelSetting; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        Self { channels }
    }

    /// Iterate over all channel settings in index order
    pub fn iter(&self) -> impl Iterator<Item = &ChannelSetting> {
        self.channels.iter()
    }

    /// Read-only snapshot of one channel for display
    pub fn query(&self, channel: usize) -> Result<ChannelSetting, SettingsError> {
        self.channels
            .get(channel)
            .copied()
            .ok_or(SettingsError::NoSuchChannel)
    }

    /// Request a start on one or all channels
    ///
    /// A channel that is already active keeps its state, so a repeated start
    /// does not restart the pre-wait.
    pub fn start(&mut self, select: ChannelSelect) -> Result<(), SettingsError> {
        self.for_each_selected(select, |setting| {
            if !setting.run_state.is_active() {
                setting.run_state = RunState::StartRequested;
            }
        })
    }

    /// Request a stop on one or all channels
    ///
    /// Takes effect at the engine's next reset check, never mid-pulse.
    pub fn stop(&mut self, select: ChannelSelect) -> Result<(), SettingsError> {
        self.for_each_selected(select, |setting| setting.run_state = RunState::Stopped)
    }

    /// Set phase amplitudes
    pub fn set_voltage(&mut self, channel: usize, voltage: Voltage) -> Result<(), SettingsError> {
        if !voltage.is_valid() {
            return Err(SettingsError::ParameterOutOfBounds);
        }
        self.slot_mut(channel)?.voltage = voltage;
        Ok(())
    }

    /// Set phase timing
    pub fn set_times(&mut self, channel: usize, times: PhaseTimes) -> Result<(), SettingsError> {
        self.slot_mut(channel)?.times = times;
        Ok(())
    }

    /// Set the frequency ramp
    pub fn set_delta(&mut self, channel: usize, delta: RampDelta) -> Result<(), SettingsError> {
        if !delta.is_valid() {
            return Err(SettingsError::ParameterOutOfBounds);
        }
        self.slot_mut(channel)?.delta = delta;
        Ok(())
    }

    /// Set the number of pulses before automatic stop (0 = unlimited)
    pub fn set_repeat_count(&mut self, channel: usize, count: u16) -> Result<(), SettingsError> {
        self.slot_mut(channel)?.pulse_limit = count;
        Ok(())
    }

    /// Mutable access for the engine, which writes `run_state`
    pub(crate) fn slot_mut(&mut self, channel: usize) -> Result<&mut ChannelSetting, SettingsError> {
        self.channels
            .get_mut(channel)
            .ok_or(SettingsError::NoSuchChannel)
    }

    fn for_each_selected(
        &mut self,
        select: ChannelSelect,
        mut apply: impl FnMut(&mut ChannelSetting),
    ) -> Result<(), SettingsError> {
        match select {
            ChannelSelect::One(channel) => apply(self.slot_mut(channel)?),
            ChannelSelect::All => self.channels.iter_mut().for_each(apply),
        }
        Ok(())
    }
}

impl<const N: usize> Default for ChannelSettings<N> {
    fn default() -> Self {
        Self::new([ChannelSetting::default(); N])
    }
}
