//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::cutoff::CutoffMode;
use crate::fsm::BatMonState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The FSM transitioned between states.
    StateChanged { from: BatMonState, to: BatMonState },

    /// A new cutoff preset took effect.
    CutoffModeChanged { from: CutoffMode, to: CutoffMode },

    /// The application service has started (carries initial state).
    Started(BatMonState),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub state: BatMonState,
    /// Last sample (V); NaN before the first tick or after a failed read.
    pub volts: f32,
    pub cutoff_mode: CutoffMode,
    pub cutoff_volts: Option<f32>,
    pub relay_on: bool,
    /// Milliseconds until a pending low-voltage cutoff is confirmed.
    pub cutoff_pending_ms: Option<u64>,
    /// Milliseconds until a pending recovery is confirmed.
    pub recovery_pending_ms: Option<u64>,
    pub ticks_in_state: u64,
    pub total_ticks: u64,
}
