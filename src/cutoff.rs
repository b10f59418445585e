//! Cutoff policy: which battery voltage counts as "critically low".
//!
//! The user cycles through six presets with the mode button.  Each preset
//! maps to a fixed cutoff voltage; [`CutoffMode::None`] disables the
//! low-power cutoff entirely, so the relay stays on regardless of voltage.
//!
//! [`CutoffPolicy`] pairs the selected mode with the engine-on band from
//! [`SystemConfig`] and answers the raw (undebounced) classification
//! questions the voltage monitor asks every tick.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::error::Error;

/// User-selectable low-voltage threshold preset.
///
/// Discriminants match the preset numbering printed on the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CutoffMode {
    /// No cutoff enforced.
    #[serde(rename = "none")]
    None = 0,
    #[default]
    #[serde(rename = "12.2V")]
    V12_2 = 1,
    #[serde(rename = "12.1V")]
    V12_1 = 2,
    #[serde(rename = "12.0V")]
    V12_0 = 3,
    #[serde(rename = "11.9V")]
    V11_9 = 4,
    #[serde(rename = "11.8V")]
    V11_8 = 5,
}

impl CutoffMode {
    /// Every preset, in button-cycling order.
    pub const ALL: [Self; 6] = [
        Self::V12_2,
        Self::V12_1,
        Self::V12_0,
        Self::V11_9,
        Self::V11_8,
        Self::None,
    ];

    /// Cutoff voltage for this preset, or `None` when cutoff is disabled.
    pub const fn cutoff_volts(self) -> Option<f32> {
        match self {
            Self::None => None,
            Self::V12_2 => Some(12.2),
            Self::V12_1 => Some(12.1),
            Self::V12_0 => Some(12.0),
            Self::V11_9 => Some(11.9),
            Self::V11_8 => Some(11.8),
        }
    }

    /// The preset selected by one more button press.
    pub const fn next(self) -> Self {
        match self {
            Self::V12_2 => Self::V12_1,
            Self::V12_1 => Self::V12_0,
            Self::V12_0 => Self::V11_9,
            Self::V11_9 => Self::V11_8,
            Self::V11_8 => Self::None,
            Self::None => Self::V12_2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::V12_2 => "12.2V",
            Self::V12_1 => "12.1V",
            Self::V12_0 => "12.0V",
            Self::V11_9 => "11.9V",
            Self::V11_8 => "11.8V",
        }
    }

    /// Parse a preset from its label (`"12.0V"`, `"12.0"` or `"none"`).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("none") {
            return Some(Self::None);
        }
        let digits = label.strip_suffix(['V', 'v']).unwrap_or(label);
        Self::ALL
            .into_iter()
            .find(|m| m.label().trim_end_matches('V') == digits)
    }
}

impl TryFrom<u8> for CutoffMode {
    type Error = Error;

    fn try_from(idx: u8) -> Result<Self, Self::Error> {
        match idx {
            0 => Ok(Self::None),
            1 => Ok(Self::V12_2),
            2 => Ok(Self::V12_1),
            3 => Ok(Self::V12_0),
            4 => Ok(Self::V11_9),
            5 => Ok(Self::V11_8),
            _ => Err(Error::InvalidCutoffMode(idx)),
        }
    }
}

impl fmt::Display for CutoffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The selected cutoff mode together with the engine-on hysteresis band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffPolicy {
    mode: CutoffMode,
    engine_on_volts: f32,
    hysteresis: f32,
}

impl CutoffPolicy {
    /// Build a policy starting in the configured default mode.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            mode: config.default_cutoff_mode,
            engine_on_volts: config.v_engine_on,
            hysteresis: config.hysteresis,
        }
    }

    pub fn mode(&self) -> CutoffMode {
        self.mode
    }

    /// Select a new preset.  Returns the previously selected one.
    pub fn select(&mut self, mode: CutoffMode) -> CutoffMode {
        core::mem::replace(&mut self.mode, mode)
    }

    /// Pick up a new engine band after a config change; the mode is kept.
    pub fn reconfigure(&mut self, config: &SystemConfig) {
        self.engine_on_volts = config.v_engine_on;
        self.hysteresis = config.hysteresis;
    }

    pub fn cutoff_volts(&self) -> Option<f32> {
        self.mode.cutoff_volts()
    }

    /// Raw "battery critically low" classification.  Never true when the
    /// cutoff is disabled.
    pub fn is_below_cutoff(&self, volts: f32) -> bool {
        self.cutoff_volts().is_some_and(|cutoff| volts < cutoff)
    }

    /// Raw "battery at or above cutoff" classification.  Always true for a
    /// finite sample when the cutoff is disabled.
    pub fn is_above_cutoff(&self, volts: f32) -> bool {
        match self.cutoff_volts() {
            Some(cutoff) => volts >= cutoff,
            None => volts.is_finite(),
        }
    }

    /// Upper edge of the hysteresis band (`V_ENGINE_ON + HYSTERESIS`).
    pub fn engine_on_threshold(&self) -> f32 {
        self.engine_on_volts + self.hysteresis
    }

    /// Lower edge of the hysteresis band (`V_ENGINE_ON - HYSTERESIS`).
    pub fn engine_off_threshold(&self) -> f32 {
        self.engine_on_volts - self.hysteresis
    }

    pub fn is_engine_on(&self, volts: f32) -> bool {
        volts >= self.engine_on_threshold()
    }

    pub fn is_engine_off(&self, volts: f32) -> bool {
        volts < self.engine_off_threshold()
    }
}
