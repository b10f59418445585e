//! Fuzz target: supervisor state machine
//!
//! Interprets the input as a stream of (sample, dt, command) records and
//! drives `AppService::evaluate` / `handle_command`, checking:
//! - No panics for any sample, including NaN and infinities
//! - `Uninitialised` is never re-entered
//! - Invalid samples never cause a transition
//! - A selected cutoff mode is in effect after the next evaluation
//!
//! cargo fuzz run fuzz_supervisor

#![no_main]

use std::time::Duration;

use batmon::adapters::log_sink::LogEventSink;
use batmon::app::commands::AppCommand;
use batmon::app::service::AppService;
use batmon::config::SystemConfig;
use batmon::cutoff::CutoffMode;
use batmon::fsm::BatMonState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut app = AppService::new(SystemConfig::default());
    app.start(&mut LogEventSink::new());
    let mut left_uninit = false;

    for rec in data.chunks_exact(6) {
        let volts = f32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]);
        let dt = Duration::from_millis(u64::from(rec[4]) * 10);

        match rec[5] % 8 {
            0 => {
                let _ = app.handle_command(AppCommand::CycleCutoffMode);
            }
            1 => {
                let _ = app.handle_command(AppCommand::ResetCutoffMode);
            }
            2 => {
                if let Ok(mode) = CutoffMode::try_from(rec[5] / 8 % 6) {
                    let _ = app.handle_command(AppCommand::SetCutoffMode(mode));
                }
            }
            _ => {}
        }

        let before = app.state();
        let selected = app.selected_mode();
        let after = app.evaluate(volts, dt);
        assert_eq!(app.cutoff_mode(), selected);

        if !volts.is_finite() {
            assert_eq!(before, after, "invalid sample caused a transition");
        }
        if left_uninit {
            assert_ne!(after, BatMonState::Uninitialised);
        }
        left_uninit |= after != BatMonState::Uninitialised;
    }
});
