//! Pulse output stage trait

/// Output polarity of one pulse phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Positive phase (T1)
    Positive,
    /// Negative phase (T3)
    Negative,
}

/// Trait for the pulse actuation stage
///
/// Implementations set the amplitude DAC and switch the H-bridge of one
/// channel. Calls are synchronous and return immediately; from the engine's
/// point of view they cannot fail, so implementations log and count bus
/// errors instead of returning them.
pub trait PulseOutput {
    /// Set the amplitude level (0..=50 units) for the next phase
    fn set_amplitude(&mut self, channel: usize, level: u8);

    /// Connect the channel to the load with the given polarity
    fn drive(&mut self, channel: usize, polarity: Polarity);

    /// Disconnect the channel (idle, no current)
    fn release(&mut self, channel: usize);
}
