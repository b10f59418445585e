//! Mock hardware adapter for integration tests.
//!
//! Replays a scripted sequence of voltages and records every actuator
//! call so tests can assert on the full command history.

use std::collections::VecDeque;

use batmon::app::events::AppEvent;
use batmon::app::ports::{ActuatorPort, EventSink, SamplerPort};
use batmon::fsm::BatMonState;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Voltages returned by successive reads.
    pub samples: VecDeque<f32>,
    /// Returned once `samples` runs dry.
    pub idle_volts: f32,
    /// Every state passed to `apply_state`, in order.
    pub applied: Vec<BatMonState>,
    pub reads: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(idle_volts: f32) -> Self {
        Self {
            samples: VecDeque::new(),
            idle_volts,
            applied: Vec::new(),
            reads: 0,
        }
    }

    /// Queue `ticks` reads at `volts`.
    pub fn queue(&mut self, volts: f32, ticks: usize) {
        self.samples.extend(std::iter::repeat_n(volts, ticks));
    }

    pub fn last_applied(&self) -> Option<BatMonState> {
        self.applied.last().copied()
    }

    pub fn relay_on(&self) -> bool {
        self.last_applied().is_some_and(BatMonState::relay_on)
    }
}

impl SamplerPort for MockHardware {
    fn read_smoothed_voltage(&mut self) -> f32 {
        self.reads += 1;
        self.samples.pop_front().unwrap_or(self.idle_volts)
    }
}

impl ActuatorPort for MockHardware {
    fn apply_state(&mut self, state: BatMonState) {
        self.applied.push(state);
    }
}

// ── RecordingSink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<(BatMonState, BatMonState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
