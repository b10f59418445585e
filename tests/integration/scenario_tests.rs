//! Voltage scenarios at the default 10 Hz tick, 10 s low delay and
//! 3 s recovery delay, driven through `AppService::evaluate`.

use std::time::Duration;

use batmon::app::commands::AppCommand;
use batmon::app::service::AppService;
use batmon::config::SystemConfig;
use batmon::cutoff::CutoffMode;
use batmon::fsm::BatMonState;

const TICK: Duration = Duration::from_millis(100);

fn supervisor(mode: CutoffMode) -> AppService {
    let config = SystemConfig {
        default_cutoff_mode: mode,
        ..SystemConfig::default()
    };
    let mut app = AppService::new(config);
    app.start(&mut batmon::adapters::log_sink::LogEventSink::new());
    app
}

/// Feed `ticks` samples at `volts`, returning the state after each.
fn feed(app: &mut AppService, volts: f32, ticks: usize) -> Vec<BatMonState> {
    (0..ticks).map(|_| app.evaluate(volts, TICK)).collect()
}

/// Supervisor already settled in `EngineStopped`.
fn stopped() -> AppService {
    let mut app = supervisor(CutoffMode::V12_2);
    assert_eq!(app.evaluate(12.6, TICK), BatMonState::EngineStopped);
    app
}

/// Supervisor already settled in `EngineRunning`.
fn running() -> AppService {
    let mut app = stopped();
    let trace = feed(&mut app, 13.4, 30);
    assert_eq!(trace[28], BatMonState::EngineStopped);
    assert_eq!(trace[29], BatMonState::EngineRunning);
    app
}

/// Supervisor already settled in `LowPowerMode`.
fn low_power() -> AppService {
    let mut app = supervisor(CutoffMode::V12_2);
    assert_eq!(app.evaluate(11.0, TICK), BatMonState::LowPowerMode);
    app
}

// ── Cutoff debounce ──────────────────────────────────────────

#[test]
fn interrupted_dip_never_cuts_off() {
    let mut app = stopped();
    let mut trace = feed(&mut app, 12.0, 99);
    trace.extend(feed(&mut app, 12.3, 1));
    trace.extend(feed(&mut app, 12.0, 99));
    assert!(!trace.contains(&BatMonState::LowPowerMode));
}

#[test]
fn sustained_dip_cuts_off_exactly_on_hundredth_tick() {
    let mut app = stopped();
    let trace = feed(&mut app, 11.5, 100);
    assert!(trace[..99].iter().all(|&s| s == BatMonState::EngineStopped));
    assert_eq!(trace[99], BatMonState::LowPowerMode);
}

#[test]
fn sustained_dip_from_running_cuts_off_on_hundredth_tick() {
    let mut app = running();
    let trace = feed(&mut app, 11.5, 100);
    assert!(!trace[..99].contains(&BatMonState::LowPowerMode));
    assert_eq!(trace[99], BatMonState::LowPowerMode);
}

#[test]
fn sample_exactly_at_cutoff_is_not_low() {
    let mut app = stopped();
    let trace = feed(&mut app, 12.2, 500);
    assert!(trace.iter().all(|&s| s == BatMonState::EngineStopped));
}

#[test]
fn no_cutoff_mode_never_enters_low_power() {
    let mut app = supervisor(CutoffMode::None);
    let trace = feed(&mut app, 5.0, 1000);
    assert!(trace.iter().all(|&s| s == BatMonState::EngineStopped));
}

// ── Recovery debounce ────────────────────────────────────────

#[test]
fn recovery_needs_three_continuous_seconds() {
    let mut app = low_power();
    let trace = feed(&mut app, 12.5, 30);
    assert!(trace[..29].iter().all(|&s| s == BatMonState::LowPowerMode));
    assert_eq!(trace[29], BatMonState::EngineStopped);
}

#[test]
fn interrupted_recovery_starts_over() {
    let mut app = low_power();
    feed(&mut app, 12.5, 20);
    feed(&mut app, 12.0, 1);
    let trace = feed(&mut app, 12.5, 30);
    assert!(trace[..29].iter().all(|&s| s == BatMonState::LowPowerMode));
    assert_eq!(trace[29], BatMonState::EngineStopped);
}

#[test]
fn recovery_with_charging_goes_straight_to_running() {
    let mut app = low_power();
    let trace = feed(&mut app, 13.5, 30);
    assert_eq!(trace[28], BatMonState::LowPowerMode);
    assert_eq!(trace[29], BatMonState::EngineRunning);
}

#[test]
fn relaxing_cutoff_allows_recovery() {
    let mut app = supervisor(CutoffMode::V12_2);
    assert_eq!(app.evaluate(12.0, TICK), BatMonState::LowPowerMode);
    assert!(feed(&mut app, 12.0, 100).iter().all(|&s| s == BatMonState::LowPowerMode));

    // Mode commands are applied by the next full tick.
    app.handle_command(AppCommand::SetCutoffMode(CutoffMode::V11_8)).unwrap();
    let mut hw = RecordingBoard(12.0, 0);
    let clock = batmon::adapters::time::SimClock::new();
    let mut sink = batmon::adapters::log_sink::LogEventSink::new();
    let mut state = app.state();
    for _ in 0..30 {
        state = app.tick(&mut hw, &clock, &mut sink);
        clock.advance(TICK);
    }
    assert_eq!(app.cutoff_mode(), CutoffMode::V11_8);
    assert_eq!(state, BatMonState::EngineStopped);
    assert_eq!(hw.1, 30);
}

struct RecordingBoard(f32, usize);

impl batmon::app::ports::SamplerPort for RecordingBoard {
    fn read_smoothed_voltage(&mut self) -> f32 {
        self.0
    }
}

impl batmon::app::ports::ActuatorPort for RecordingBoard {
    fn apply_state(&mut self, _state: BatMonState) {
        self.1 += 1;
    }
}

// ── Engine hysteresis ────────────────────────────────────────

#[test]
fn stopped_holds_inside_band() {
    let mut app = stopped();
    let trace = feed(&mut app, 13.05, 1000);
    assert!(trace.iter().all(|&s| s == BatMonState::EngineStopped));
}

#[test]
fn running_holds_inside_band() {
    let mut app = running();
    let trace = feed(&mut app, 12.95, 1000);
    assert!(trace.iter().all(|&s| s == BatMonState::EngineRunning));
}

#[test]
fn running_stops_after_confirmed_drop() {
    let mut app = running();
    let trace = feed(&mut app, 12.7, 30);
    assert!(trace[..29].iter().all(|&s| s == BatMonState::EngineRunning));
    assert_eq!(trace[29], BatMonState::EngineStopped);
}

#[test]
fn brief_charge_spike_does_not_start_engine() {
    let mut app = stopped();
    feed(&mut app, 13.4, 29);
    let trace = feed(&mut app, 12.8, 100);
    assert!(trace.iter().all(|&s| s == BatMonState::EngineStopped));
}

#[test]
fn low_voltage_beats_engine_signal() {
    // Cutoff above the engine band forces both conditions at once.
    let config = SystemConfig {
        v_engine_on: 11.0,
        hysteresis: 0.1,
        ..SystemConfig::default()
    };
    let mut app = AppService::new(config);
    app.start(&mut batmon::adapters::log_sink::LogEventSink::new());
    app.evaluate(12.6, TICK);
    let trace = feed(&mut app, 11.5, 100);
    assert_eq!(trace[29], BatMonState::EngineRunning);
    assert_eq!(trace[99], BatMonState::LowPowerMode);
}

// ── Invalid samples ──────────────────────────────────────────

#[test]
fn invalid_sample_resets_cutoff_progress() {
    let mut app = stopped();
    let mut trace = feed(&mut app, 11.5, 99);
    trace.extend(feed(&mut app, f32::NAN, 1));
    trace.extend(feed(&mut app, 11.5, 99));
    assert!(trace.iter().all(|&s| s == BatMonState::EngineStopped));
    assert_eq!(app.evaluate(11.5, TICK), BatMonState::LowPowerMode);
}

#[test]
fn invalid_samples_never_transition() {
    for mut app in [stopped(), running(), low_power()] {
        let before = app.state();
        let trace = feed(&mut app, f32::INFINITY, 200);
        assert!(trace.iter().all(|&s| s == before));
    }
}
