//! Voltage monitor.
//!
//! The monitor runs **every tick before the FSM**.  It classifies the
//! smoothed battery voltage against the cutoff policy and the engine
//! band, pushes each raw classification through its own debounce filter,
//! and writes the confirmed results into a [`Signals`] snapshot that the
//! FSM state handlers read.
//!
//! ## Monitored conditions
//!
//! | Filter       | Raw condition                      | Confirms after |
//! |--------------|------------------------------------|----------------|
//! | `low`        | v < cutoff                         | low delay      |
//! | `recovered`  | v >= cutoff (or no cutoff)         | high delay     |
//! | `engine_on`  | v >= V_ENGINE_ON + HYSTERESIS      | engine delay   |
//! | `engine_off` | v <  V_ENGINE_ON - HYSTERESIS      | engine delay   |
//!
//! An invalid (non-finite) sample satisfies none of them, so every
//! filter resets and nothing is confirmed that tick.

use core::time::Duration;

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::cutoff::CutoffPolicy;
use crate::debounce::DebounceFilter;
use crate::fsm::context::Signals;

/// Debounced voltage classifier.
pub struct VoltageMonitor {
    low: DebounceFilter,
    recovered: DebounceFilter,
    engine_on: DebounceFilter,
    engine_off: DebounceFilter,
}

impl VoltageMonitor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            low: DebounceFilter::new(config.low_delay()),
            recovered: DebounceFilter::new(config.high_delay()),
            engine_on: DebounceFilter::new(config.engine_delay()),
            engine_off: DebounceFilter::new(config.engine_delay()),
        }
    }

    /// Pick up new delays after a config change.  Progress is kept.
    pub fn reconfigure(&mut self, config: &SystemConfig) {
        self.low.set_threshold(config.low_delay());
        self.recovered.set_threshold(config.high_delay());
        self.engine_on.set_threshold(config.engine_delay());
        self.engine_off.set_threshold(config.engine_delay());
    }

    /// Classify one sample covering `dt` of elapsed time.
    pub fn update(&mut self, volts: f32, policy: &CutoffPolicy, dt: Duration) -> Signals {
        let valid = volts.is_finite();
        if !valid {
            warn!("MONITOR: invalid sample ({volts}), debounce progress reset");
        }

        let below_cutoff = Self::eval(
            &mut self.low,
            "below cutoff",
            valid && policy.is_below_cutoff(volts),
            dt,
        );
        let recovered = Self::eval(
            &mut self.recovered,
            "recovered",
            valid && policy.is_above_cutoff(volts),
            dt,
        );
        let engine_on = Self::eval(
            &mut self.engine_on,
            "engine on",
            valid && policy.is_engine_on(volts),
            dt,
        );
        let engine_off = Self::eval(
            &mut self.engine_off,
            "engine off",
            valid && policy.is_engine_off(volts),
            dt,
        );

        Signals {
            volts,
            valid,
            below_cutoff,
            recovered,
            engine_on,
            engine_off,
        }
    }

    /// Time left before a low-voltage cutoff is confirmed, if one is pending.
    pub fn cutoff_pending(&self) -> Option<Duration> {
        self.low.is_pending().then(|| self.low.remaining())
    }

    /// Time left before recovery is confirmed, if one is pending.
    pub fn recovery_pending(&self) -> Option<Duration> {
        self.recovered.is_pending().then(|| self.recovered.remaining())
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Update one filter and log the edges worth knowing about.
    fn eval(filter: &mut DebounceFilter, name: &str, condition: bool, dt: Duration) -> bool {
        let was_pending = filter.is_pending();
        let was_confirmed = filter.is_confirmed();
        let confirmed = filter.update(condition, dt);

        if confirmed && !was_confirmed {
            info!("MONITOR: {name} confirmed");
        } else if filter.is_pending() && !was_pending && !was_confirmed {
            debug!(
                "MONITOR: {name} pending, {}ms to confirm",
                filter.remaining().as_millis()
            );
        } else if was_pending && !condition {
            debug!("MONITOR: {name} cleared before confirmation");
        }

        confirmed
    }
}
