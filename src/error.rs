//! Unified error types for the BatMon supervisor.
//!
//! The supervisory core (debounce, cutoff lookup, FSM) is total and never
//! returns an error.  Everything fallible lives at the edges: configuration
//! loading, mode selection by index, the ADC sampler, the output pins and
//! the simulator's profile parser.  All variants are `Copy` so they can be
//! logged and passed around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A cutoff mode index outside `0..=5` was selected.
    InvalidCutoffMode(u8),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
    /// The battery voltage sampler failed.
    Sensor(SensorError),
    /// A relay or LED output could not be driven.
    Actuator(ActuatorError),
    /// A simulator voltage profile contains a malformed line (1-based).
    Profile { line: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCutoffMode(idx) => write!(f, "invalid cutoff mode index {idx}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Profile { line } => write!(f, "profile: malformed step on line {line}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Relay GPIO write failed.
    RelayWriteFailed,
    /// Status LED GPIO write failed.
    LedWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelayWriteFailed => write!(f, "relay write failed"),
            Self::LedWriteFailed => write!(f, "LED write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
