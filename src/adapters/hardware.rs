//! Hardware adapter — bridges peripherals to domain port traits.
//!
//! Owns the battery sampler and the actuator drivers, exposing them
//! through [`SamplerPort`] and [`ActuatorPort`].  This is the only module
//! that touches pins.  Faults are logged here and never reach the core:
//! a failed sample becomes NaN, which the supervisor treats as invalid.

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{ActuatorPort, SamplerPort};
use crate::config::SystemConfig;
use crate::drivers::relay::Relay;
use crate::drivers::status_led::StatusLeds;
use crate::fsm::BatMonState;
use crate::fsm::context::OutputCommands;
use crate::sensors::AdcChannel;
use crate::sensors::battery::BatterySampler;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<A, P, G, R> {
    sampler: BatterySampler<A>,
    relay: Relay<P>,
    leds: StatusLeds<G, R>,
    tick_period: Duration,
    sensor_faults: u32,
    actuator_faults: u32,
}

impl<A, P, G, R> HardwareAdapter<A, P, G, R>
where
    A: AdcChannel,
    P: OutputPin,
    G: OutputPin,
    R: OutputPin,
{
    pub fn new(
        sampler: BatterySampler<A>,
        relay: Relay<P>,
        leds: StatusLeds<G, R>,
        config: &SystemConfig,
    ) -> Self {
        Self {
            sampler,
            relay,
            leds,
            tick_period: config.tick_period(),
            sensor_faults: 0,
            actuator_faults: 0,
        }
    }

    /// Sampler bursts that produced no usable reading.
    pub fn sensor_faults(&self) -> u32 {
        self.sensor_faults
    }

    /// Relay or LED writes that failed.
    pub fn actuator_faults(&self) -> u32 {
        self.actuator_faults
    }
}

// ── SamplerPort implementation ────────────────────────────────

impl<A, P, G, R> SamplerPort for HardwareAdapter<A, P, G, R>
where
    A: AdcChannel,
    P: OutputPin,
    G: OutputPin,
    R: OutputPin,
{
    fn read_smoothed_voltage(&mut self) -> f32 {
        match self.sampler.sample() {
            Ok(volts) => volts,
            Err(e) => {
                self.sensor_faults = self.sensor_faults.saturating_add(1);
                warn!("HW: battery sample failed: {e}");
                f32::NAN
            }
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A, P, G, R> ActuatorPort for HardwareAdapter<A, P, G, R>
where
    A: AdcChannel,
    P: OutputPin,
    G: OutputPin,
    R: OutputPin,
{
    fn apply_state(&mut self, state: BatMonState) {
        let cmds = OutputCommands::for_state(state);

        if let Err(e) = self.relay.set(cmds.relay_on) {
            self.actuator_faults = self.actuator_faults.saturating_add(1);
            warn!("HW: {e} (wanted relay_on={})", cmds.relay_on);
        }
        if let Err(e) = self.leds.render(cmds.led, self.tick_period) {
            self.actuator_faults = self.actuator_faults.saturating_add(1);
            warn!("HW: {e}");
        }
    }
}
