//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events through the
//! `log` facade.  In JSON mode every event is one `serde_json` line, for
//! piping simulator output into other tools.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    json: bool,
}

impl LogEventSink {
    /// Human-readable lines.
    pub fn new() -> Self {
        Self { json: false }
    }

    /// One JSON object per event.
    pub fn json() -> Self {
        Self { json: true }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => info!("{line}"),
                Err(e) => warn!("EVENT | serialisation failed: {e}"),
            }
            return;
        }

        match event {
            AppEvent::Telemetry(t) => {
                let cutoff = t
                    .cutoff_volts
                    .map_or_else(|| String::from("none"), |v| format!("{v:.1}V"));
                info!(
                    "TELEM | state={} | V={:.2} | cutoff={} | relay={} | \
                     low_in={:?}ms recover_in={:?}ms | in_state={} total={}",
                    t.state,
                    t.volts,
                    cutoff,
                    if t.relay_on { "ON" } else { "OFF" },
                    t.cutoff_pending_ms,
                    t.recovery_pending_ms,
                    t.ticks_in_state,
                    t.total_ticks,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::CutoffModeChanged { from, to } => {
                info!("MODE  | {} -> {}", from, to);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
        }
    }
}
