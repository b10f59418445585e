//! Two-colour status LED driver.
//!
//! Discrete green and red LEDs on two GPIOs.  The driver renders a
//! [`LedIndication`] each tick; the blink phase advances with tick time
//! and toggles every [`BLINK_HALF_PERIOD`].
//!
//! | Indication   | Green           | Red |
//! |--------------|-----------------|-----|
//! | `Off`        | off             | off |
//! | `Green`      | on              | off |
//! | `GreenBlink` | 0.5 s on / off  | off |
//! | `Red`        | off             | on  |

use core::time::Duration;

use embedded_hal::digital::{OutputPin, PinState};

use crate::error::ActuatorError;
use crate::fsm::context::LedIndication;

/// Half of the slow blink period.
pub const BLINK_HALF_PERIOD: Duration = Duration::from_millis(500);

pub struct StatusLeds<G, R> {
    green: G,
    red: R,
    indication: LedIndication,
    phase: Duration,
    /// Levels last written, `(green, red)`.
    current: Option<(bool, bool)>,
}

impl<G: OutputPin, R: OutputPin> StatusLeds<G, R> {
    pub fn new(green: G, red: R) -> Self {
        Self {
            green,
            red,
            indication: LedIndication::Off,
            phase: Duration::ZERO,
            current: None,
        }
    }

    /// Render `indication` after `dt` of tick time.
    ///
    /// Switching indication restarts the blink phase, so a fresh
    /// `GreenBlink` always begins lit.
    pub fn render(&mut self, indication: LedIndication, dt: Duration) -> Result<(), ActuatorError> {
        if indication != self.indication {
            self.indication = indication;
            self.phase = Duration::ZERO;
        } else {
            let period = (BLINK_HALF_PERIOD * 2).as_nanos();
            let phase = self.phase.saturating_add(dt).as_nanos() % period;
            self.phase = Duration::from_nanos(phase as u64);
        }

        let levels = match indication {
            LedIndication::Off => (false, false),
            LedIndication::Green => (true, false),
            LedIndication::GreenBlink => (self.phase < BLINK_HALF_PERIOD, false),
            LedIndication::Red => (false, true),
        };
        self.write(levels)
    }

    /// Both LEDs dark.
    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.indication = LedIndication::Off;
        self.phase = Duration::ZERO;
        self.write((false, false))
    }

    /// `(green, red)` levels last written.
    pub fn levels(&self) -> (bool, bool) {
        self.current.unwrap_or((false, false))
    }

    fn write(&mut self, levels: (bool, bool)) -> Result<(), ActuatorError> {
        if self.current == Some(levels) {
            return Ok(());
        }
        self.green
            .set_state(PinState::from(levels.0))
            .map_err(|_| ActuatorError::LedWriteFailed)?;
        self.red
            .set_state(PinState::from(levels.1))
            .map_err(|_| ActuatorError::LedWriteFailed)?;
        self.current = Some(levels);
        Ok(())
    }
}
