//! Sensor subsystem — ADC access and the battery voltage sampler.
//!
//! The sampler produces one smoothed voltage per tick that the hardware
//! adapter hands to the application core through `SamplerPort`.

pub mod battery;

use crate::error::SensorError;

/// One analog input channel.
///
/// Implemented by the board's ADC driver on target, and by fakes in tests
/// and the simulator.
pub trait AdcChannel {
    /// One raw conversion, in counts.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

impl<T: AdcChannel + ?Sized> AdcChannel for &mut T {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        (**self).read_raw()
    }
}
