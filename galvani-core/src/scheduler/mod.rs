//! Cooperative main loop
//!
//! One iteration polls the command interpreter once, then advances the
//! waveform engine for every channel. There is no preemption: a pulse on
//! one channel delays the interpreter and every other channel for its full
//! width.

use crate::config::ChannelSettings;
use crate::traits::{MicroDelay, PulseOutput, TickClock};
use crate::waveform::{EngineEvent, WaveformEngine};

/// Operator-facing side of the main loop
///
/// Implemented by the serial terminal; tests use scripted interpreters.
pub trait CommandInterpreter<const N: usize> {
    /// Consume pending input and apply at most one complete command
    ///
    /// Must not block.
    fn poll(&mut self, settings: &mut ChannelSettings<N>, engine: &WaveformEngine<N>);

    /// Show an engine transition to the operator
    fn report(&mut self, channel: usize, event: EngineEvent);
}

/// The main-loop context: settings, engine and their hardware
pub struct Scheduler<C, D, O, const N: usize> {
    settings: ChannelSettings<N>,
    engine: WaveformEngine<N>,
    clock: C,
    delay: D,
    output: O,
}

impl<C, D, O, const N: usize> Scheduler<C, D, O, N>
where
    C: TickClock,
    D: MicroDelay,
    O: PulseOutput,
{
    /// Create a scheduler with every channel idle
    pub fn new(settings: ChannelSettings<N>, clock: C, delay: D, output: O) -> Self {
        Self {
            settings,
            engine: WaveformEngine::new(),
            clock,
            delay,
            output,
        }
    }

    /// Run one loop iteration
    pub fn iterate<I: CommandInterpreter<N>>(&mut self, interpreter: &mut I) {
        interpreter.poll(&mut self.settings, &self.engine);

        let events = self.engine.service(
            &mut self.settings,
            &self.clock,
            &mut self.delay,
            &mut self.output,
        );
        for (channel, event) in events {
            #[cfg(feature = "defmt")]
            defmt::debug!("ch{}: {}", channel, event);
            interpreter.report(channel, event);
        }
    }

    /// Current settings
    pub fn settings(&self) -> &ChannelSettings<N> {
        &self.settings
    }

    /// Replace or edit settings outside the command path (persistence load)
    pub fn settings_mut(&mut self) -> &mut ChannelSettings<N> {
        &mut self.settings
    }

    /// Engine state, read-only
    pub fn engine(&self) -> &WaveformEngine<N> {
        &self.engine
    }

    /// Pulse output stage
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Pulse output stage, for shutdown outside the engine
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelSelect, PhaseTimes, RampDelta, RunState};
    use crate::traits::{Polarity, Tick, TickCounter};
    use crate::waveform::WaveState;
    use std::vec::Vec;

    /// Delay that also drives the shared counter, like the tick interrupt
    struct CountingDelay<'a> {
        counter: &'a TickCounter,
    }

    impl MicroDelay for CountingDelay<'_> {
        fn delay_100us(&mut self, count: u16) {
            for _ in 0..count {
                self.counter.increment();
            }
        }
    }

    #[derive(Default)]
    struct PulseCounter {
        positive: [u32; 2],
    }

    impl PulseOutput for PulseCounter {
        fn set_amplitude(&mut self, _channel: usize, _level: u8) {}

        fn drive(&mut self, channel: usize, polarity: Polarity) {
            if polarity == Polarity::Positive {
                self.positive[channel] += 1;
            }
        }

        fn release(&mut self, _channel: usize) {}
    }

    /// Interpreter that replays one scripted action per poll
    #[derive(Default)]
    struct Scripted {
        script: Vec<Option<ChannelSelect>>,
        polls: usize,
        reports: Vec<(usize, EngineEvent)>,
        seen_states: Vec<WaveState>,
    }

    impl CommandInterpreter<2> for Scripted {
        fn poll(&mut self, settings: &mut ChannelSettings<2>, engine: &WaveformEngine<2>) {
            if let Some(Some(select)) = self.script.get(self.polls) {
                settings.start(*select).unwrap();
            }
            self.polls += 1;
            if let Some(runtime) = engine.runtime(0) {
                self.seen_states.push(runtime.state);
            }
        }

        fn report(&mut self, channel: usize, event: EngineEvent) {
            self.reports.push((channel, event));
        }
    }

    fn fast_settings() -> ChannelSettings<2> {
        let mut settings = ChannelSettings::<2>::default();
        for ch in 0..2 {
            settings
                .set_times(ch, PhaseTimes::from_array([0, 1, 0, 1, 20]))
                .unwrap();
            settings.set_delta(ch, RampDelta::flat()).unwrap();
        }
        settings
    }

    #[test]
    fn test_poll_precedes_engine() {
        let counter = TickCounter::new();
        let mut scheduler = Scheduler::new(
            fast_settings(),
            &counter,
            CountingDelay { counter: &counter },
            PulseCounter::default(),
        );
        let mut interpreter = Scripted {
            script: std::vec![Some(ChannelSelect::One(0))],
            ..Default::default()
        };

        scheduler.iterate(&mut interpreter);

        // start applied in the same iteration
        assert_eq!(interpreter.reports, [(0, EngineEvent::Started)]);
        assert_eq!(interpreter.seen_states, [WaveState::Idle]);
        assert_eq!(
            scheduler.settings().query(0).unwrap().run_state,
            RunState::StartRequested
        );
    }

    #[test]
    fn test_channels_serviced_in_order() {
        let counter = TickCounter::new();
        let mut scheduler = Scheduler::new(
            fast_settings(),
            &counter,
            CountingDelay { counter: &counter },
            PulseCounter::default(),
        );
        let mut interpreter = Scripted {
            script: std::vec![Some(ChannelSelect::All)],
            ..Default::default()
        };

        scheduler.iterate(&mut interpreter);
        assert_eq!(
            interpreter.reports,
            [(0, EngineEvent::Started), (1, EngineEvent::Started)]
        );
    }

    #[test]
    fn test_run_produces_pulses() {
        let counter = TickCounter::new();
        let mut scheduler = Scheduler::new(
            fast_settings(),
            &counter,
            CountingDelay { counter: &counter },
            PulseCounter::default(),
        );
        let mut interpreter = Scripted {
            script: std::vec![Some(ChannelSelect::All)],
            ..Default::default()
        };

        for _ in 0..2000 {
            scheduler.iterate(&mut interpreter);
            counter.increment();
        }

        let pulses = scheduler.output().positive;
        assert!(pulses[0] > 50);
        assert!(pulses[0].abs_diff(pulses[1]) <= 1);
        assert_eq!(
            scheduler.engine().runtime(1).unwrap().pulses_emitted,
            pulses[1]
        );
        assert_ne!(counter.read(), Tick(0));
    }
}
