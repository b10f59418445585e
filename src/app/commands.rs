//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (mode button,
//! simulator script) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use crate::config::SystemConfig;
use crate::cutoff::CutoffMode;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Select a specific cutoff preset.  Takes effect on the next tick.
    SetCutoffMode(CutoffMode),

    /// Advance to the next preset (short button press).
    CycleCutoffMode,

    /// Return to the configured default preset (long button press).
    ResetCutoffMode,

    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(SystemConfig),
}
