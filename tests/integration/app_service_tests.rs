//! Integration tests for the AppService → FSM → actuator pipeline.
//!
//! Drives the full `tick()` path with a mock board, a recording sink and
//! a simulated clock.

use std::time::Duration;

use super::mock_hw::{MockHardware, RecordingSink};

use batmon::adapters::time::SimClock;
use batmon::app::commands::AppCommand;
use batmon::app::events::AppEvent;
use batmon::app::service::AppService;
use batmon::config::SystemConfig;
use batmon::cutoff::CutoffMode;
use batmon::fsm::BatMonState;

const TICK: Duration = Duration::from_millis(100);

struct Rig {
    app: AppService,
    hw: MockHardware,
    sink: RecordingSink,
    clock: SimClock,
}

impl Rig {
    fn new(idle_volts: f32) -> Self {
        let mut sink = RecordingSink::new();
        let mut app = AppService::new(SystemConfig::default());
        app.start(&mut sink);
        Self {
            app,
            hw: MockHardware::new(idle_volts),
            sink,
            clock: SimClock::new(),
        }
    }

    fn tick(&mut self) -> BatMonState {
        let state = self.app.tick(&mut self.hw, &self.clock, &mut self.sink);
        self.clock.advance(TICK);
        state
    }

    fn run(&mut self, volts: f32, ticks: usize) -> BatMonState {
        self.hw.queue(volts, ticks);
        let mut state = self.app.state();
        for _ in 0..ticks {
            state = self.tick();
        }
        state
    }
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_emits_started_event() {
    let rig = Rig::new(12.6);
    assert_eq!(rig.sink.events, vec![AppEvent::Started(BatMonState::Uninitialised)]);
    assert_eq!(rig.app.state(), BatMonState::Uninitialised);
    assert!(rig.hw.applied.is_empty());
}

#[test]
fn healthy_first_sample_enters_engine_stopped() {
    let mut rig = Rig::new(12.6);
    assert_eq!(rig.tick(), BatMonState::EngineStopped);
    assert_eq!(
        rig.sink.transitions(),
        vec![(BatMonState::Uninitialised, BatMonState::EngineStopped)]
    );
    assert!(rig.hw.relay_on());
}

#[test]
fn low_first_sample_enters_low_power_at_once() {
    let mut rig = Rig::new(11.0);
    assert_eq!(rig.tick(), BatMonState::LowPowerMode);
    assert!(!rig.hw.relay_on());
}

#[test]
fn invalid_samples_hold_uninitialised() {
    let mut rig = Rig::new(12.6);
    assert_eq!(rig.run(f32::NAN, 20), BatMonState::Uninitialised);
    assert_eq!(rig.hw.applied, vec![BatMonState::Uninitialised; 20]);
    assert!(!rig.hw.relay_on());
    assert_eq!(rig.tick(), BatMonState::EngineStopped);
}

// ── Actuator contract ────────────────────────────────────────

#[test]
fn apply_state_called_once_per_tick() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 10);
    rig.run(11.0, 150);
    rig.run(f32::NAN, 5);
    rig.run(13.5, 40);
    assert_eq!(rig.hw.reads, 205);
    assert_eq!(rig.hw.applied.len(), 205);
    assert_eq!(rig.hw.last_applied(), Some(rig.app.state()));
}

#[test]
fn state_changed_events_match_actuator_history() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 5);
    rig.run(11.0, 120);
    rig.run(12.6, 40);

    let mut expected = Vec::new();
    let mut prev = BatMonState::Uninitialised;
    for &s in &rig.hw.applied {
        if s != prev {
            expected.push((prev, s));
            prev = s;
        }
    }
    assert_eq!(rig.sink.transitions(), expected);
    assert_eq!(
        expected,
        vec![
            (BatMonState::Uninitialised, BatMonState::EngineStopped),
            (BatMonState::EngineStopped, BatMonState::LowPowerMode),
            (BatMonState::LowPowerMode, BatMonState::EngineStopped),
        ]
    );
}

// ── Mode selection ───────────────────────────────────────────

#[test]
fn mode_change_takes_effect_on_next_tick() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 3);

    rig.app
        .handle_command(AppCommand::SetCutoffMode(CutoffMode::V11_8))
        .unwrap();
    assert_eq!(rig.app.cutoff_mode(), CutoffMode::V12_2);
    assert_eq!(rig.app.selected_mode(), CutoffMode::V11_8);

    rig.tick();
    assert_eq!(rig.app.cutoff_mode(), CutoffMode::V11_8);
    assert!(rig.sink.events.contains(&AppEvent::CutoffModeChanged {
        from: CutoffMode::V12_2,
        to: CutoffMode::V11_8,
    }));

    // 12.0 V is now healthy.
    assert_eq!(rig.run(12.0, 300), BatMonState::EngineStopped);
}

#[test]
fn reselecting_same_mode_emits_nothing() {
    let mut rig = Rig::new(12.6);
    rig.tick();
    rig.app
        .handle_command(AppCommand::SetCutoffMode(CutoffMode::V12_2))
        .unwrap();
    rig.tick();
    assert!(!rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::CutoffModeChanged { .. })));
}

#[test]
fn cycle_and_reset_follow_button_order() {
    let mut rig = Rig::new(12.6);
    for expected in [
        CutoffMode::V12_1,
        CutoffMode::V12_0,
        CutoffMode::V11_9,
        CutoffMode::V11_8,
        CutoffMode::None,
        CutoffMode::V12_2,
    ] {
        rig.app.handle_command(AppCommand::CycleCutoffMode).unwrap();
        rig.tick();
        assert_eq!(rig.app.cutoff_mode(), expected);
    }

    rig.app.handle_command(AppCommand::CycleCutoffMode).unwrap();
    rig.app.handle_command(AppCommand::ResetCutoffMode).unwrap();
    rig.tick();
    assert_eq!(rig.app.cutoff_mode(), CutoffMode::V12_2);
}

#[test]
fn switching_to_none_releases_pending_cutoff() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 1);
    rig.run(11.0, 50);
    assert!(rig.app.build_telemetry().cutoff_pending_ms.is_some());

    rig.app
        .handle_command(AppCommand::SetCutoffMode(CutoffMode::None))
        .unwrap();
    assert_eq!(rig.run(11.0, 200), BatMonState::EngineStopped);
    assert_eq!(rig.app.build_telemetry().cutoff_pending_ms, None);
}

// ── Configuration ────────────────────────────────────────────

#[test]
fn config_update_changes_delays() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 1);

    let fast = SystemConfig {
        low_delay_ms: 1_000,
        ..SystemConfig::default()
    };
    rig.app.handle_command(AppCommand::UpdateConfig(fast)).unwrap();

    assert_eq!(rig.run(11.0, 9), BatMonState::EngineStopped);
    assert_eq!(rig.run(11.0, 1), BatMonState::LowPowerMode);
}

#[test]
fn rejected_config_keeps_running_config() {
    let mut rig = Rig::new(12.6);
    let bad = SystemConfig {
        hysteresis: -1.0,
        ..SystemConfig::default()
    };
    assert!(rig.app.handle_command(AppCommand::UpdateConfig(bad)).is_err());
    assert_eq!(rig.app.config(), &SystemConfig::default());
}

// ── Timing ───────────────────────────────────────────────────

#[test]
fn clock_stall_counts_as_a_single_tick() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 1);

    // The loop stalls for 12 s, then reads one low sample.
    rig.clock.advance(Duration::from_secs(12));
    assert_eq!(rig.run(11.5, 1), BatMonState::EngineStopped);
    assert_eq!(rig.app.build_telemetry().cutoff_pending_ms, Some(9_900));

    assert_eq!(rig.run(11.5, 98), BatMonState::EngineStopped);
    assert_eq!(rig.run(11.5, 1), BatMonState::LowPowerMode);
}

#[test]
fn slow_ticks_still_need_every_observation() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 1);

    // Ticks arriving 1 s apart each count for one nominal period.
    rig.hw.queue(11.0, 100);
    let mut trace = Vec::new();
    for _ in 0..100 {
        trace.push(rig.app.tick(&mut rig.hw, &rig.clock, &mut rig.sink));
        rig.clock.advance(Duration::from_secs(1));
    }
    assert_eq!(trace[98], BatMonState::EngineStopped);
    assert_eq!(trace[99], BatMonState::LowPowerMode);
}

#[test]
fn odd_loop_frequency_confirms_on_exact_tick() {
    let config = SystemConfig {
        loop_freq_hz: 7,
        ..SystemConfig::default()
    };
    let period = config.tick_period();
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(config);
    app.start(&mut sink);
    let mut hw = MockHardware::new(11.5);
    let clock = SimClock::new();

    hw.queue(12.6, 1);
    assert_eq!(app.tick(&mut hw, &clock, &mut sink), BatMonState::EngineStopped);
    clock.advance(period);

    // 10 s at 7 Hz is 70 ticks.
    let mut confirmed_at = None;
    for n in 1..=80u32 {
        if app.tick(&mut hw, &clock, &mut sink) == BatMonState::LowPowerMode {
            confirmed_at = Some(n);
            break;
        }
        clock.advance(period);
    }
    assert_eq!(confirmed_at, Some(70));
}

#[test]
fn telemetry_tracks_ticks() {
    let mut rig = Rig::new(12.6);
    rig.run(12.6, 25);
    let t = rig.app.build_telemetry();
    assert_eq!(t.state, BatMonState::EngineStopped);
    assert_eq!(t.total_ticks, 25);
    assert_eq!(t.ticks_in_state, 24);
    assert!(t.relay_on);
    assert!((t.volts - 12.6).abs() < f32::EPSILON);
}
