//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌────────────────┬───────────┬──────────┬────────────────┐  │
//! │  │ BatMonState    │ on_enter  │ on_exit  │ on_update      │  │
//! │  ├────────────────┼───────────┼──────────┼────────────────┤  │
//! │  │ EngineRunning  │ fn(ctx)   │ —        │ fn(ctx)->Opt<> │  │
//! │  │ EngineStopped  │ fn(ctx)   │ —        │ fn(ctx)->Opt<> │  │
//! │  │ LowPowerMode   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Opt<> │  │
//! │  │ Uninitialised  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Opt<> │  │
//! │  └────────────────┴───────────┴──────────┴────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut FsmContext`, which
//! holds the confirmed voltage signals, the cutoff policy and the
//! output commands.  Handlers never touch hardware.

pub mod context;
pub mod states;

use core::fmt;

use context::FsmContext;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The supervisor's authoritative state.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum BatMonState {
    /// Relay on, battery above `V_ENGINE_ON + HYSTERESIS`: alternator charging.
    EngineRunning = 0,
    /// Relay on, battery above the cutoff: engine off, battery healthy.
    EngineStopped = 1,
    /// Relay off, battery below the cutoff.
    LowPowerMode = 2,
    /// No valid sample seen yet.
    Uninitialised = 3,
}

impl BatMonState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `BatMonState`.  Panics on out-of-range in
    /// debug builds; returns `LowPowerMode` (relay off) in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::EngineRunning,
            1 => Self::EngineStopped,
            2 => Self::LowPowerMode,
            3 => Self::Uninitialised,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::LowPowerMode
            }
        }
    }

    /// Whether the load relay is closed in this state.
    pub fn relay_on(self) -> bool {
        matches!(self, Self::EngineRunning | Self::EngineStopped)
    }
}

impl fmt::Display for BatMonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EngineRunning => "ENGINE_RUNNING",
            Self::EngineStopped => "ENGINE_STOPPED",
            Self::LowPowerMode => "LOW_POWER_MODE",
            Self::Uninitialised => "UNINITIALISED",
        })
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<BatMonState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array, no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: BatMonState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the mutable
/// [`FsmContext`] is threaded through every handler call by the caller.
pub struct Fsm {
    /// Fixed-size table indexed by `BatMonState as usize`.
    table: [StateDescriptor; BatMonState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
    /// Number of transitions taken since start.
    transitions: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in
    /// `Uninitialised`.
    pub fn new(table: [StateDescriptor; BatMonState::COUNT]) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id as usize == i),
            "state table out of order"
        );
        Self {
            table,
            current: BatMonState::Uninitialised as usize,
            tick_count: 0,
            state_entry_tick: 0,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Increment tick counters.
    /// 2. Call `on_update` for the current state.
    /// 3. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) -> BatMonState {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            if next_id as usize != self.current {
                self.transition(next_id, ctx);
            }
        }
        self.current_state()
    }

    /// The current state's identity.
    pub fn current_state(&self) -> BatMonState {
        BatMonState::from_index(self.current)
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    /// Total ticks since start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Number of transitions taken since start.
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: BatMonState, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {} (V={:.2})",
            self.table[self.current].name, self.table[next_idx].name, ctx.signals.volts
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        // Update pointer and timing
        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        self.transitions += 1;
        ctx.ticks_in_state = 0;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
