//! Waveform state and runtime bookkeeping

use crate::traits::Tick;

/// Position of a channel in its pulse cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveState {
    /// Not generating
    #[default]
    Idle,
    /// Waiting T0 after a start request
    PreWait,
    /// Next service emits one pulse
    Pulse,
    /// Waiting out the current period
    InterWait,
}

impl WaveState {
    /// Numeric state code shown on the terminal
    pub const fn as_u8(self) -> u8 {
        match self {
            WaveState::Idle => 0,
            WaveState::PreWait => 1,
            WaveState::Pulse => 2,
            WaveState::InterWait => 3,
        }
    }
}

/// Engine-owned per-channel runtime, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRuntime {
    /// Current state
    pub state: WaveState,
    /// Pulses emitted since the last start
    pub pulses_emitted: u32,
    /// Reference point for the running wait
    pub last_transition: Tick,
    /// Active period in ticks (T4 minus applied ramp steps)
    pub current_period: u16,
    /// Pulses emitted at the active period
    pub pulses_in_current_period: u32,
    /// Ramp steps applied since the period last reset to T4
    pub steps_applied: u16,
}

impl ChannelRuntime {
    /// Drop back to idle and clear the counters
    pub fn reset(&mut self) {
        self.state = WaveState::Idle;
        self.pulses_emitted = 0;
        self.pulses_in_current_period = 0;
        self.steps_applied = 0;
    }
}
