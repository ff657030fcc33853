//! Events reported by the waveform engine

/// Channel transitions worth telling the operator about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineEvent {
    /// Start acknowledged, pre-wait running
    Started,
    /// Pre-wait elapsed, first pulse is next
    Running,
    /// Ramp changed the active period (ticks)
    PeriodChanged(u16),
    /// Pulse limit reached
    Completed {
        /// Pulses emitted in this run
        pulses: u32,
    },
    /// Channel returned to idle
    Stopped,
}
