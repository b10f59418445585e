//! Load-disconnect relay driver.
//!
//! The relay coil is driven from a single GPIO; high closes the contact
//! and powers the load.  Writes are skipped when the requested level is
//! already the commanded one.

use embedded_hal::digital::{OutputPin, PinState};
use log::debug;

use crate::error::ActuatorError;

pub struct Relay<P> {
    pin: P,
    /// Last level successfully written; `None` until the first write.
    commanded: Option<bool>,
}

impl<P: OutputPin> Relay<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            commanded: None,
        }
    }

    /// Close (`true`) or open (`false`) the relay.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.commanded == Some(on) {
            return Ok(());
        }
        self.pin
            .set_state(PinState::from(on))
            .map_err(|_| ActuatorError::RelayWriteFailed)?;
        debug!("RELAY: {}", if on { "closed" } else { "open" });
        self.commanded = Some(on);
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.commanded == Some(true)
    }

    /// Release the pin.
    pub fn free(self) -> P {
        self.pin
    }
}
