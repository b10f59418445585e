//! System configuration parameters
//!
//! Build-time constants for the supervisor and the [`SystemConfig`] they
//! seed.  The simulator can override any field from a JSON file at
//! startup; nothing is persisted.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cutoff::CutoffMode;
use crate::error::{Error, Result};

/// Battery voltage above which the engine is considered running.
pub const V_ENGINE_ON: f32 = 13.0;
/// Half-width of the band around [`V_ENGINE_ON`].
pub const HYSTERESIS: f32 = 0.1;

/// Main loop frequency, in Hz.
pub const LOOP_FREQ_HZ: u32 = 10;
/// Ticks of continuous low voltage before cutoff (10 seconds).
pub const LOW_DELAY_TICKS: u32 = 10 * LOOP_FREQ_HZ;
/// Ticks of continuous good voltage before the relay is re-enabled (3 seconds).
pub const HIGH_DELAY_TICKS: u32 = 3 * LOOP_FREQ_HZ;

/// Raw ADC readings averaged within one tick.
pub const NUM_SAMPLES: u8 = 7;
/// Burst averages kept in the rolling window.
pub const N_SAMPLE: u8 = 5;
/// Capacity of the sampler's rolling window.
pub const MAX_WINDOW: usize = 16;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Engine detection ---
    /// Engine-on voltage (V).
    pub v_engine_on: f32,
    /// Hysteresis around `v_engine_on` (V).
    pub hysteresis: f32,

    // --- Cutoff ---
    /// Preset selected at power-up.
    pub default_cutoff_mode: CutoffMode,

    // --- Timing ---
    /// Evaluation loop frequency (Hz).
    pub loop_freq_hz: u32,
    /// Continuous low voltage required before cutoff (ms).
    pub low_delay_ms: u32,
    /// Continuous recovery required before the relay closes again (ms).
    pub high_delay_ms: u32,
    /// Continuous engine-on / engine-off evidence required (ms).
    pub engine_delay_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,

    // --- Sampler ---
    /// Raw readings averaged per tick.
    pub burst_samples: u8,
    /// Burst averages in the rolling window (at most [`MAX_WINDOW`]).
    pub window_samples: u8,
    /// ADC reference voltage (V).
    pub adc_ref_volts: f32,
    /// Full-scale ADC reading.
    pub adc_max: u16,
    /// Battery-to-ADC resistive divider ratio.
    pub divider_ratio: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let tick_ms = 1000 / LOOP_FREQ_HZ;
        Self {
            v_engine_on: V_ENGINE_ON,
            hysteresis: HYSTERESIS,

            default_cutoff_mode: CutoffMode::V12_2,

            loop_freq_hz: LOOP_FREQ_HZ,
            low_delay_ms: LOW_DELAY_TICKS * tick_ms,     // 10 s
            high_delay_ms: HIGH_DELAY_TICKS * tick_ms,   // 3 s
            engine_delay_ms: HIGH_DELAY_TICKS * tick_ms, // 3 s
            telemetry_interval_secs: 60,

            burst_samples: NUM_SAMPLES,
            window_samples: N_SAMPLE,
            // 10-bit ADC on a 5 V reference behind a 4:1 divider → 20 V full scale.
            adc_ref_volts: 5.0,
            adc_max: 1023,
            divider_ratio: 4.0,
        }
    }
}

impl SystemConfig {
    /// Duration of one evaluation tick, rounded up to the next nanosecond
    /// so that `n` ticks never fall short of `n / loop_freq_hz` seconds.
    pub fn tick_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000u64.div_ceil(u64::from(self.loop_freq_hz.max(1))))
    }

    pub fn low_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.low_delay_ms))
    }

    pub fn high_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.high_delay_ms))
    }

    pub fn engine_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.engine_delay_ms))
    }

    /// Number of ticks per telemetry report (at least one).
    pub fn telemetry_interval_ticks(&self) -> u64 {
        (u64::from(self.telemetry_interval_secs) * u64::from(self.loop_freq_hz)).max(1)
    }

    /// Reject configurations that would make the supervisor misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.loop_freq_hz == 0 || self.loop_freq_hz > 1000 {
            return Err(Error::Config("loop_freq_hz must be in 1..=1000"));
        }
        // A zero delay would let one sample confirm a transition.
        if self.low_delay_ms == 0 || self.high_delay_ms == 0 || self.engine_delay_ms == 0 {
            return Err(Error::Config("debounce delays must be non-zero"));
        }
        if !self.v_engine_on.is_finite() || !self.hysteresis.is_finite() {
            return Err(Error::Config("engine band must be finite"));
        }
        if self.hysteresis < 0.0 {
            return Err(Error::Config("hysteresis must not be negative"));
        }
        let highest_cutoff = CutoffMode::ALL
            .iter()
            .filter_map(|m| m.cutoff_volts())
            .fold(f32::MIN, f32::max);
        if self.v_engine_on - self.hysteresis <= highest_cutoff {
            return Err(Error::Config(
                "engine-off threshold must sit above every cutoff preset",
            ));
        }
        if self.burst_samples == 0 {
            return Err(Error::Config("burst_samples must be at least 1"));
        }
        if self.window_samples == 0 || usize::from(self.window_samples) > MAX_WINDOW {
            return Err(Error::Config("window_samples must be in 1..=16"));
        }
        if self.adc_max == 0 || !(self.adc_ref_volts > 0.0) || !(self.divider_ratio > 0.0) {
            return Err(Error::Config("ADC calibration must be positive"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.  Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
