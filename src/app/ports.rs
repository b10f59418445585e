//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sampler, actuator, clock, event sinks) implement these
//! traits.  The [`AppService`](super::service::AppService) consumes them via
//! generics, so the supervisory core never touches hardware pins directly.

use core::time::Duration;

use crate::fsm::BatMonState;

// ───────────────────────────────────────────────────────────────
// Sampler port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SamplerPort {
    /// Smoothed battery voltage in volts.  Noise-reduced but may still
    /// contain transients.  A failed read is reported as a non-finite
    /// value, which the supervisor treats as an invalid sample.
    fn read_smoothed_voltage(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: called once per tick with the authoritative state.
///
/// Implementations must be idempotent: the same state arrives every tick
/// for as long as it holds.
pub trait ActuatorPort {
    fn apply_state(&mut self, state: BatMonState);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source driving the debounce accumulators.
pub trait ClockPort {
    /// Time since an arbitrary fixed origin.  Must never go backwards.
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
