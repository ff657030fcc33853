//! Ramp and termination update
//!
//! Runs once at every period boundary, before the next pulse is scheduled.

use super::events::EngineEvent;
use super::state::ChannelRuntime;
use crate::config::{ChannelSetting, RunState};

/// Apply the pulse limit and frequency ramp at a period boundary
///
/// Sets `run_state` to [`RunState::Stopped`] once the pulse limit is
/// reached. Otherwise, when ramping, shortens `current_period` by
/// `delta.step` every `delta.pulses_per_step` pulses and snaps it back to T4
/// after `delta.max_steps` steps.
///
/// The period never shrinks below the pulse width (T1 + T2 + T3). A
/// period already shorter than that, or not longer than the step, is left
/// as is.
pub fn period_boundary(
    runtime: &mut ChannelRuntime,
    setting: &mut ChannelSetting,
) -> Option<EngineEvent> {
    let limit = setting.pulse_limit;
    if limit != 0 && runtime.pulses_emitted >= u32::from(limit) {
        setting.run_state = RunState::Stopped;
        return Some(EngineEvent::Completed {
            pulses: runtime.pulses_emitted,
        });
    }

    let delta = setting.delta;
    if delta.step == 0 {
        // flat profile follows live edits of T4
        runtime.current_period = setting.times.period;
        return None;
    }

    if runtime.pulses_in_current_period < u32::from(delta.pulses_per_step) {
        return None;
    }

    let current = runtime.current_period;
    if current > delta.step {
        let floor = setting.times.pulse_width().min(current);
        runtime.current_period = (current - delta.step).max(floor);
    }

    runtime.steps_applied = runtime.steps_applied.saturating_add(1);
    if runtime.steps_applied > delta.max_steps {
        runtime.steps_applied = 0;
        runtime.current_period = setting.times.period;
    }

    runtime.pulses_in_current_period = 0;
    Some(EngineEvent::PeriodChanged(runtime.current_period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhaseTimes, RampDelta};

    fn ramping(step: u16, pulses_per_step: u16, max_steps: u16) -> ChannelSetting {
        ChannelSetting {
            run_state: RunState::Running,
            times: PhaseTimes::from_array([0, 10, 0, 10, 1000]),
            delta: RampDelta {
                step,
                pulses_per_step,
                max_steps,
            },
            ..Default::default()
        }
    }

    fn runtime_at(period: u16) -> ChannelRuntime {
        ChannelRuntime {
            current_period: period,
            ..Default::default()
        }
    }

    /// Emit `pulses_per_step` pulses and hit the boundary
    fn step_boundary(
        runtime: &mut ChannelRuntime,
        setting: &mut ChannelSetting,
    ) -> Option<EngineEvent> {
        let per = u32::from(setting.delta.pulses_per_step);
        runtime.pulses_emitted += per;
        runtime.pulses_in_current_period += per;
        period_boundary(runtime, setting)
    }

    #[test]
    fn test_pulse_limit_stops() {
        let mut setting = ramping(0, 1, 4);
        setting.pulse_limit = 3;
        let mut runtime = runtime_at(1000);

        runtime.pulses_emitted = 2;
        assert_eq!(period_boundary(&mut runtime, &mut setting), None);
        assert_eq!(setting.run_state, RunState::Running);

        runtime.pulses_emitted = 3;
        assert_eq!(
            period_boundary(&mut runtime, &mut setting),
            Some(EngineEvent::Completed { pulses: 3 })
        );
        assert_eq!(setting.run_state, RunState::Stopped);
    }

    #[test]
    fn test_flat_profile_resyncs_period() {
        let mut setting = ramping(0, 1, 4);
        let mut runtime = runtime_at(1000);

        setting.times.period = 1500;
        runtime.pulses_in_current_period = 7;
        assert_eq!(period_boundary(&mut runtime, &mut setting), None);
        assert_eq!(runtime.current_period, 1500);
        // counter is left alone on a flat profile
        assert_eq!(runtime.pulses_in_current_period, 7);
    }

    #[test]
    fn test_below_threshold_no_change() {
        let mut setting = ramping(100, 5, 4);
        let mut runtime = runtime_at(1000);
        runtime.pulses_in_current_period = 4;

        assert_eq!(period_boundary(&mut runtime, &mut setting), None);
        assert_eq!(runtime.current_period, 1000);
        assert_eq!(runtime.steps_applied, 0);
    }

    #[test]
    fn test_sawtooth() {
        let mut setting = ramping(100, 2, 3);
        let mut runtime = runtime_at(1000);

        for k in 1..=3u16 {
            let event = step_boundary(&mut runtime, &mut setting);
            assert_eq!(event, Some(EngineEvent::PeriodChanged(1000 - 100 * k)));
            assert_eq!(runtime.steps_applied, k);
            assert_eq!(runtime.pulses_in_current_period, 0);
        }

        // max_steps + 1 boundaries resets to T4
        let event = step_boundary(&mut runtime, &mut setting);
        assert_eq!(event, Some(EngineEvent::PeriodChanged(1000)));
        assert_eq!(runtime.steps_applied, 0);
    }

    #[test]
    fn test_step_larger_than_period_leaves_period() {
        let mut setting = ramping(500, 1, 10);
        let mut runtime = runtime_at(400);

        let event = step_boundary(&mut runtime, &mut setting);
        assert_eq!(event, Some(EngineEvent::PeriodChanged(400)));
        assert_eq!(runtime.steps_applied, 1);
    }

    #[test]
    fn test_period_floor_at_pulse_width() {
        // pulse width 100 + 10 + 200 = 310
        let mut setting = ramping(300, 1, 10);
        setting.times = PhaseTimes::from_array([0, 100, 10, 200, 1000]);
        let mut runtime = runtime_at(1000);

        step_boundary(&mut runtime, &mut setting);
        assert_eq!(runtime.current_period, 700);
        step_boundary(&mut runtime, &mut setting);
        assert_eq!(runtime.current_period, 400);
        step_boundary(&mut runtime, &mut setting);
        assert_eq!(runtime.current_period, 310);
        step_boundary(&mut runtime, &mut setting);
        assert_eq!(runtime.current_period, 310);
    }

    #[test]
    fn test_floor_never_lengthens_period() {
        // pulse width 310 is longer than the active period
        let mut setting = ramping(50, 1, 10);
        setting.times = PhaseTimes::from_array([0, 100, 10, 200, 1000]);
        let mut runtime = runtime_at(200);

        step_boundary(&mut runtime, &mut setting);
        assert_eq!(runtime.current_period, 200);
    }

    #[test]
    fn test_ramp_monotonic_until_reset() {
        let mut setting = ramping(70, 3, 10);
        let mut runtime = runtime_at(1000);
        let mut previous = runtime.current_period;

        for k in 1..=10u16 {
            step_boundary(&mut runtime, &mut setting);
            assert!(runtime.current_period <= previous);
            assert_eq!(runtime.current_period, (1000 - 70 * k).max(20));
            previous = runtime.current_period;
        }
        step_boundary(&mut runtime, &mut setting);
        assert_eq!(runtime.current_period, 1000);
    }
}
