//! Waveform engine
//!
//! Drives every channel's state machine once per scheduler iteration:
//!
//! ```text
//!   IDLE ──start──▶ PRE_WAIT ──T0──▶ PULSE ──▶ INTER_WAIT ──period──▶ PULSE ...
//!     ▲                                                     │
//!     └──────────── run state not StartRequested/Running ───┘
//! ```
//!
//! Settings are read live on every call and never cached, so an edit from
//! the command layer takes effect at the next decision point. A pulse is
//! emitted synchronously and blocks the caller for T1 + T2 + T3.

use heapless::Vec;

use super::events::EngineEvent;
use super::ramp::period_boundary;
use super::state::{ChannelRuntime, WaveState};
use crate::config::{ChannelSetting, ChannelSettings, RunState};
use crate::traits::{MicroDelay, Polarity, PulseOutput, Tick, TickClock};

/// Pulse engine for `N` channels
#[derive(Debug, Clone)]
pub struct WaveformEngine<const N: usize> {
    runtime: [ChannelRuntime; N],
}

impl<const N: usize> WaveformEngine<N> {
    /// Create an engine with every channel idle
    pub const fn new() -> Self {
        Self {
            runtime: [ChannelRuntime {
                state: WaveState::Idle,
                pulses_emitted: 0,
                last_transition: Tick(0),
                current_period: 0,
                pulses_in_current_period: 0,
                steps_applied: 0,
            }; N],
        }
    }

    /// Snapshot of one channel's runtime
    pub fn runtime(&self, channel: usize) -> Option<ChannelRuntime> {
        self.runtime.get(channel).copied()
    }

    /// Advance every channel once, in index order, against one tick snapshot
    ///
    /// Returns the transitions that happened during this pass.
    pub fn service<C, D, O>(
        &mut self,
        settings: &mut ChannelSettings<N>,
        clock: &C,
        delay: &mut D,
        output: &mut O,
    ) -> Vec<(usize, EngineEvent), N>
    where
        C: TickClock,
        D: MicroDelay,
        O: PulseOutput,
    {
        let now = clock.now();
        let mut events = Vec::new();

        for channel in 0..N {
            let Ok(setting) = settings.slot_mut(channel) else {
                continue;
            };
            let runtime = &mut self.runtime[channel];
            if let Some(event) = step(channel, runtime, setting, now, clock, delay, output) {
                // at most one event per channel per pass
                let _ = events.push((channel, event));
            }
        }

        events
    }
}

impl<const N: usize> Default for WaveformEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance one channel by one decision
fn step<C, D, O>(
    channel: usize,
    runtime: &mut ChannelRuntime,
    setting: &mut ChannelSetting,
    now: Tick,
    clock: &C,
    delay: &mut D,
    output: &mut O,
) -> Option<EngineEvent>
where
    C: TickClock,
    D: MicroDelay,
    O: PulseOutput,
{
    if !setting.run_state.is_active() {
        let was_running = runtime.state != WaveState::Idle;
        runtime.reset();
        if setting.run_state != RunState::Stopped {
            setting.run_state = RunState::Stopped;
        }
        return was_running.then_some(EngineEvent::Stopped);
    }

    match runtime.state {
        WaveState::Idle => {
            if setting.run_state == RunState::StartRequested {
                runtime.last_transition = now;
                runtime.current_period = setting.times.period;
                runtime.state = WaveState::PreWait;
                return Some(EngineEvent::Started);
            }
            // an active state other than StartRequested is never valid in idle
            setting.run_state = RunState::Stopped;
            None
        }
        WaveState::PreWait => {
            if now.elapsed_since(runtime.last_transition) >= setting.times.pre_wait {
                setting.run_state = RunState::Running;
                runtime.last_transition = now;
                runtime.state = WaveState::Pulse;
                return Some(EngineEvent::Running);
            }
            None
        }
        WaveState::Pulse => {
            emit_pulse(channel, setting, delay, output);
            runtime.last_transition = clock.now();
            runtime.pulses_emitted = runtime.pulses_emitted.saturating_add(1);
            runtime.pulses_in_current_period = runtime.pulses_in_current_period.saturating_add(1);
            runtime.state = WaveState::InterWait;
            None
        }
        WaveState::InterWait => {
            if now.elapsed_since(runtime.last_transition) < runtime.current_period {
                return None;
            }
            let event = period_boundary(runtime, setting);
            if setting.run_state.is_active() {
                runtime.last_transition = now;
                runtime.state = WaveState::Pulse;
            }
            event
        }
    }
}

/// Positive phase, interphase gap, negative phase
fn emit_pulse<D: MicroDelay, O: PulseOutput>(
    channel: usize,
    setting: &ChannelSetting,
    delay: &mut D,
    output: &mut O,
) {
    let times = setting.times;

    output.set_amplitude(channel, setting.voltage.positive);
    output.drive(channel, Polarity::Positive);
    delay.delay_100us(times.positive);
    output.release(channel);

    if times.interphase > 0 {
        delay.delay_100us(times.interphase);
    }

    output.set_amplitude(channel, setting.voltage.negative);
    if times.negative > 0 {
        output.drive(channel, Polarity::Negative);
        delay.delay_100us(times.negative);
        output.release(channel);
    }
}
