//! Channel setting types
//!
//! All times are counts of 100 µs ticks. Amplitudes are abstract units
//! 0..=50, mapped to an output voltage by the actuation stage.

/// Highest amplitude level accepted at the mutation boundary
pub const MAX_VOLTAGE: u8 = 50;

/// Highest ramp step count accepted at the mutation boundary
pub const MAX_RAMP_STEPS: u16 = 10;

/// Requested run state of a channel
///
/// Written by the command layer and by the engine (start acknowledge,
/// completion). Raw values outside the known set survive as
/// [`RunState::Undefined`] so a persisted image round-trips byte for byte;
/// the engine treats them as stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Channel idle
    #[default]
    Stopped,
    /// Operator asked for a start; engine has not acknowledged yet
    StartRequested,
    /// Engine has left the pre-wait and is pulsing
    Running,
    /// Any other raw value
    Undefined(u8),
}

impl RunState {
    /// Decode the persisted byte
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => RunState::Stopped,
            1 => RunState::StartRequested,
            2 => RunState::Running,
            other => RunState::Undefined(other),
        }
    }

    /// Encode to the persisted byte
    pub const fn as_raw(self) -> u8 {
        match self {
            RunState::Stopped => 0,
            RunState::StartRequested => 1,
            RunState::Running => 2,
            RunState::Undefined(raw) => raw,
        }
    }

    /// True for the states that keep the engine out of its reset path
    pub const fn is_active(self) -> bool {
        matches!(self, RunState::StartRequested | RunState::Running)
    }
}

/// Phase amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Voltage {
    /// Level during the positive phase
    pub positive: u8,
    /// Level during the negative phase
    pub negative: u8,
}

impl Voltage {
    /// Check both levels against [`MAX_VOLTAGE`]
    pub const fn is_valid(&self) -> bool {
        self.positive <= MAX_VOLTAGE && self.negative <= MAX_VOLTAGE
    }
}

impl Default for Voltage {
    fn default() -> Self {
        // 2.5 up, 1.0 down
        Self {
            positive: 25,
            negative: 10,
        }
    }
}

/// Timing of one pulse train, in 100 µs ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseTimes {
    /// T0: wait between start and the first pulse
    pub pre_wait: u16,
    /// T1: positive phase
    pub positive: u16,
    /// T2: gap between the phases
    pub interphase: u16,
    /// T3: negative phase (0 = monophasic)
    pub negative: u16,
    /// T4: nominal period between pulses
    pub period: u16,
}

impl PhaseTimes {
    /// Total time one pulse keeps the main loop busy (T1 + T2 + T3)
    pub const fn pulse_width(&self) -> u16 {
        self.positive
            .saturating_add(self.interphase)
            .saturating_add(self.negative)
    }

    /// Fields in persisted order
    pub const fn as_array(&self) -> [u16; 5] {
        [
            self.pre_wait,
            self.positive,
            self.interphase,
            self.negative,
            self.period,
        ]
    }

    /// Build from fields in persisted order
    pub const fn from_array(t: [u16; 5]) -> Self {
        Self {
            pre_wait: t[0],
            positive: t[1],
            interphase: t[2],
            negative: t[3],
            period: t[4],
        }
    }
}

impl Default for PhaseTimes {
    fn default() -> Self {
        Self::from_array([50000, 100, 10, 200, 10000])
    }
}

/// Frequency ramp configuration
///
/// Every `pulses_per_step` pulses the period shrinks by `step` ticks; after
/// `max_steps` shortenings it snaps back to T4 (sawtooth).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampDelta {
    /// Period decrement in ticks (0 = flat profile)
    pub step: u16,
    /// Pulses emitted at one period before stepping
    pub pulses_per_step: u16,
    /// Number of steps before the period resets
    pub max_steps: u16,
}

impl RampDelta {
    /// A non-ramping profile
    pub const fn flat() -> Self {
        Self {
            step: 0,
            pulses_per_step: 50000,
            max_steps: 4,
        }
    }

    /// Check `max_steps` against [`MAX_RAMP_STEPS`]
    pub const fn is_valid(&self) -> bool {
        self.max_steps <= MAX_RAMP_STEPS
    }

    /// Fields in persisted order
    pub const fn as_array(&self) -> [u16; 3] {
        [self.step, self.pulses_per_step, self.max_steps]
    }

    /// Build from fields in persisted order
    pub const fn from_array(d: [u16; 3]) -> Self {
        Self {
            step: d[0],
            pulses_per_step: d[1],
            max_steps: d[2],
        }
    }
}

impl Default for RampDelta {
    fn default() -> Self {
        Self::flat()
    }
}

/// Complete configuration of one output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSetting {
    /// Requested run state
    pub run_state: RunState,
    /// Phase amplitudes
    pub voltage: Voltage,
    /// Phase timing
    pub times: PhaseTimes,
    /// Frequency ramp
    pub delta: RampDelta,
    /// Pulses to emit before stopping (0 = unlimited)
    pub pulse_limit: u16,
}

impl ChannelSetting {
    /// Check the bounds enforced at the mutation boundary
    pub const fn is_valid(&self) -> bool {
        self.voltage.is_valid() && self.delta.is_valid()
    }
}
