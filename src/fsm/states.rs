//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers.
//!
//! ```text
//!                  ┌───────────────┐
//!                  │ UNINITIALISED │
//!                  └───────┬───────┘
//!          [first sample ≥ cutoff] [first sample < cutoff]
//!                  ▼                         ▼
//!   ┌──────────────────┐            ┌────────────────┐
//!   │  ENGINE_STOPPED  │──[low]────▶│ LOW_POWER_MODE │
//!   └──────────────────┘            └────────────────┘
//!      │          ▲      ◀──[recovered]──┘  │
//!  [engine on] [engine off]                 │
//!      ▼          │      ◀──[recovered + engine on]
//!   ┌──────────────────┐                    │
//!   │  ENGINE_RUNNING  │──[low]─────────────┘
//!   └──────────────────┘
//! ```
//!
//! Every signal read here is already debounced by the voltage monitor,
//! except the single raw comparison used to leave `Uninitialised`.

use super::context::{FsmContext, OutputCommands};
use super::{BatMonState, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; BatMonState::COUNT] {
    [
        // Index 0 — EngineRunning
        StateDescriptor {
            id: BatMonState::EngineRunning,
            name: "EngineRunning",
            on_enter: Some(running_enter),
            on_exit: None,
            on_update: running_update,
        },
        // Index 1 — EngineStopped
        StateDescriptor {
            id: BatMonState::EngineStopped,
            name: "EngineStopped",
            on_enter: Some(stopped_enter),
            on_exit: None,
            on_update: stopped_update,
        },
        // Index 2 — LowPowerMode
        StateDescriptor {
            id: BatMonState::LowPowerMode,
            name: "LowPowerMode",
            on_enter: Some(low_power_enter),
            on_exit: Some(low_power_exit),
            on_update: low_power_update,
        },
        // Index 3 — Uninitialised
        StateDescriptor {
            id: BatMonState::Uninitialised,
            name: "Uninitialised",
            on_enter: Some(uninitialised_enter),
            on_exit: Some(uninitialised_exit),
            on_update: uninitialised_update,
        },
    ]
}

/// Engine classification shared by the states that honour the band.
fn engine_state(ctx: &FsmContext, current: BatMonState) -> BatMonState {
    let s = &ctx.signals;
    if s.engine_on {
        BatMonState::EngineRunning
    } else if s.engine_off {
        BatMonState::EngineStopped
    } else {
        current
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNINITIALISED state — waiting for the first valid sample
// ═══════════════════════════════════════════════════════════════════════════

fn uninitialised_enter(ctx: &mut FsmContext) {
    ctx.commands = OutputCommands::for_state(BatMonState::Uninitialised);
    info!("UNINITIALISED: relay open, waiting for first valid sample");
}

fn uninitialised_exit(ctx: &mut FsmContext) {
    info!(
        "UNINITIALISED: first sample {:.2}V, cutoff {}",
        ctx.signals.volts,
        ctx.policy.mode()
    );
}

fn uninitialised_update(ctx: &mut FsmContext) -> Option<BatMonState> {
    if !ctx.signals.valid {
        return None;
    }
    if ctx.sample_above_cutoff() {
        Some(BatMonState::EngineStopped)
    } else {
        Some(BatMonState::LowPowerMode)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ENGINE_STOPPED state — engine off, battery healthy, load powered
// ═══════════════════════════════════════════════════════════════════════════

fn stopped_enter(ctx: &mut FsmContext) {
    ctx.commands = OutputCommands::for_state(BatMonState::EngineStopped);
    info!("ENGINE_STOPPED: relay closed at {:.2}V", ctx.signals.volts);
}

fn stopped_update(ctx: &mut FsmContext) -> Option<BatMonState> {
    // Guard: confirmed low battery → cut the load
    if ctx.signals.below_cutoff {
        return Some(BatMonState::LowPowerMode);
    }

    match engine_state(ctx, BatMonState::EngineStopped) {
        BatMonState::EngineStopped => None,
        next => Some(next),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ENGINE_RUNNING state — alternator charging, load powered
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut FsmContext) {
    ctx.commands = OutputCommands::for_state(BatMonState::EngineRunning);
    info!("ENGINE_RUNNING: charging at {:.2}V", ctx.signals.volts);
}

fn running_update(ctx: &mut FsmContext) -> Option<BatMonState> {
    // A low battery wins even over a momentary alternator spike.
    if ctx.signals.below_cutoff {
        return Some(BatMonState::LowPowerMode);
    }

    match engine_state(ctx, BatMonState::EngineRunning) {
        BatMonState::EngineRunning => None,
        next => Some(next),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOW_POWER_MODE state — load disconnected
// ═══════════════════════════════════════════════════════════════════════════

fn low_power_enter(ctx: &mut FsmContext) {
    ctx.commands = OutputCommands::for_state(BatMonState::LowPowerMode);
    match ctx.policy.cutoff_volts() {
        Some(cutoff) => warn!(
            "LOW_POWER_MODE: relay opened, {:.2}V below {:.1}V cutoff",
            ctx.signals.volts, cutoff
        ),
        None => warn!("LOW_POWER_MODE: relay opened at {:.2}V", ctx.signals.volts),
    }
}

fn low_power_exit(ctx: &mut FsmContext) {
    info!(
        "LOW_POWER_MODE: battery recovered to {:.2}V after {} ticks, relay re-enabled",
        ctx.signals.volts, ctx.ticks_in_state
    );
}

fn low_power_update(ctx: &mut FsmContext) -> Option<BatMonState> {
    if ctx.signals.below_cutoff || !ctx.signals.recovered {
        return None;
    }

    if ctx.signals.engine_on {
        Some(BatMonState::EngineRunning)
    } else {
        Some(BatMonState::EngineStopped)
    }
}
