//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the confirmed signals produced by the voltage
//! monitor this tick, the output commands derived from the current state,
//! the selected cutoff policy, and timing.  It replaces what would
//! otherwise be global mutable state, so the whole supervisor can be
//! driven from a test with nothing but a sequence of samples.

use crate::cutoff::CutoffPolicy;

use super::BatMonState;

// ---------------------------------------------------------------------------
// Signals (read-only to state handlers; written by the voltage monitor)
// ---------------------------------------------------------------------------

/// One tick's worth of classified voltage evidence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    /// Smoothed battery voltage this tick (V).
    pub volts: f32,
    /// False when the sample was NaN or infinite.
    pub valid: bool,
    /// Voltage confirmed below the cutoff for the low delay.
    pub below_cutoff: bool,
    /// Voltage confirmed at or above the cutoff for the high delay.
    pub recovered: bool,
    /// Voltage confirmed at or above `V_ENGINE_ON + HYSTERESIS`.
    pub engine_on: bool,
    /// Voltage confirmed below `V_ENGINE_ON - HYSTERESIS`.
    pub engine_off: bool,
}

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; consumed by the actuator)
// ---------------------------------------------------------------------------

/// What the status LEDs should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedIndication {
    #[default]
    Off,
    /// Solid green: engine running, charging.
    Green,
    /// Slow green blink: engine off, battery healthy.
    GreenBlink,
    /// Solid red: load disconnected.
    Red,
}

/// Relay and LED commands for one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputCommands {
    /// `true` = relay closed, load powered.
    pub relay_on: bool,
    pub led: LedIndication,
}

impl OutputCommands {
    /// Relay open, LEDs dark.
    pub fn all_off() -> Self {
        Self::default()
    }

    /// The single mapping from supervisory state to outputs.
    pub fn for_state(state: BatMonState) -> Self {
        match state {
            BatMonState::EngineRunning => Self {
                relay_on: true,
                led: LedIndication::Green,
            },
            BatMonState::EngineStopped => Self {
                relay_on: true,
                led: LedIndication::GreenBlink,
            },
            BatMonState::LowPowerMode => Self {
                relay_on: false,
                led: LedIndication::Red,
            },
            BatMonState::Uninitialised => Self::all_off(),
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Inputs --
    /// Confirmed signals.  Updated before each FSM tick.
    pub signals: Signals,
    /// Selected cutoff mode and engine band.
    pub policy: CutoffPolicy,

    // -- Outputs --
    /// Commands to be applied to the relay and LEDs after the FSM tick.
    pub commands: OutputCommands,
}

impl FsmContext {
    pub fn new(policy: CutoffPolicy) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            signals: Signals::default(),
            policy,
            commands: OutputCommands::all_off(),
        }
    }

    /// Raw test used only to leave `Uninitialised`: is this tick's sample
    /// at or above the cutoff?
    pub fn sample_above_cutoff(&self) -> bool {
        self.signals.valid && self.policy.is_above_cutoff(self.signals.volts)
    }
}
