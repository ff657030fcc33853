//! Pulse actuation stage
//!
//! Combines the digipot amplitude DAC and the per-channel H-bridges into
//! the [`PulseOutput`] the waveform engine drives. Channel `c` uses digipot
//! `c / 2`, wiper `c % 2`.

use heapless::Vec;

use crate::amplitude::{Mcp42100, Pot};
use crate::bridge::HBridge;
use galvani_core::config::MAX_CHANNELS;
use galvani_core::traits::{Polarity, PulseOutput};
use galvani_hal::{OutputPin, SpiBus};

/// Digipots needed for the largest board
pub const MAX_DIGIPOTS: usize = MAX_CHANNELS.div_ceil(2);

/// Amplitude DAC plus H-bridges for `N` channels
pub struct PulseStage<S, P, const N: usize> {
    spi: S,
    digipots: Vec<Mcp42100<P>, MAX_DIGIPOTS>,
    bridges: [HBridge<P>; N],
    spi_errors: u32,
}

impl<S, P, const N: usize> PulseStage<S, P, N>
where
    S: SpiBus,
    P: OutputPin,
{
    /// Create a stage
    ///
    /// `digipots` must hold one chip for every pair of channels; channels
    /// without a chip keep their bridge but cannot change amplitude.
    pub fn new(
        spi: S,
        digipots: Vec<Mcp42100<P>, MAX_DIGIPOTS>,
        bridges: [HBridge<P>; N],
    ) -> Self {
        Self {
            spi,
            digipots,
            bridges,
            spi_errors: 0,
        }
    }

    /// Amplitude writes that failed on the bus
    pub fn spi_errors(&self) -> u32 {
        self.spi_errors
    }

    /// Shared SPI bus, for peripherals initialized after the stage
    pub fn spi_mut(&mut self) -> &mut S {
        &mut self.spi
    }

    /// Release every channel and zero every wiper
    pub fn release_all(&mut self) {
        for bridge in &mut self.bridges {
            bridge.release();
        }
        for pot in &mut self.digipots {
            if pot.write_wiper(&mut self.spi, Pot::Both, 0).is_err() {
                self.spi_errors = self.spi_errors.saturating_add(1);
            }
        }
    }
}

impl<S, P, const N: usize> PulseOutput for PulseStage<S, P, N>
where
    S: SpiBus,
    P: OutputPin,
{
    fn set_amplitude(&mut self, channel: usize, level: u8) {
        let pot = if channel % 2 == 0 { Pot::Pot0 } else { Pot::Pot1 };
        let Some(digipot) = self.digipots.get_mut(channel / 2) else {
            return;
        };
        if digipot.write_level(&mut self.spi, pot, level).is_err() {
            self.spi_errors = self.spi_errors.saturating_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("ch{}: amplitude write failed", channel);
        }
    }

    fn drive(&mut self, channel: usize, polarity: Polarity) {
        if let Some(bridge) = self.bridges.get_mut(channel) {
            bridge.drive(polarity);
        }
    }

    fn release(&mut self, channel: usize) {
        if let Some(bridge) = self.bridges.get_mut(channel) {
            bridge.release();
        }
    }
}
