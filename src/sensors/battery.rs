//! Battery voltage sampler.
//!
//! Each tick takes a burst of raw conversions, averages the good ones,
//! scales the average through the resistor divider, and keeps a rolling
//! window of burst averages for a running mean.
//!
//! ```text
//! ADC ─(burst of N)─▶ mean counts ─▶ volts ─▶ window ─▶ smoothed volts
//! ```

use heapless::HistoryBuffer;
use log::{debug, warn};

use crate::config::{MAX_WINDOW, SystemConfig};
use crate::error::SensorError;

use super::AdcChannel;

/// Divider calibration: counts → battery volts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// ADC reference voltage (V at full scale).
    pub ref_volts: f32,
    /// Full-scale count.
    pub adc_max: u16,
    /// Battery volts per volt at the ADC pin.
    pub divider_ratio: f32,
}

impl Calibration {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            ref_volts: config.adc_ref_volts,
            adc_max: config.adc_max,
            divider_ratio: config.divider_ratio,
        }
    }

    pub fn counts_to_volts(&self, counts: f32) -> f32 {
        counts / f32::from(self.adc_max) * self.ref_volts * self.divider_ratio
    }
}

/// Burst-averaging, window-smoothing battery sampler.
pub struct BatterySampler<A> {
    adc: A,
    cal: Calibration,
    burst: u8,
    window_len: usize,
    window: HistoryBuffer<f32, MAX_WINDOW>,
}

impl<A: AdcChannel> BatterySampler<A> {
    pub fn new(adc: A, config: &SystemConfig) -> Self {
        Self {
            adc,
            cal: Calibration::from_config(config),
            burst: config.burst_samples.max(1),
            window_len: usize::from(config.window_samples).clamp(1, MAX_WINDOW),
            window: HistoryBuffer::new(),
        }
    }

    /// Take one burst and return the smoothed battery voltage.
    ///
    /// Conversions above full scale are discarded.  If the whole burst is
    /// lost the window is left untouched and the error returned.
    pub fn sample(&mut self) -> Result<f32, SensorError> {
        let mut sum: u32 = 0;
        let mut good: u32 = 0;
        let mut last_err = SensorError::AdcReadFailed;

        for _ in 0..self.burst {
            match self.adc.read_raw() {
                Ok(raw) if raw <= self.cal.adc_max => {
                    sum += u32::from(raw);
                    good += 1;
                }
                Ok(raw) => {
                    debug!("SAMPLER: discarding out-of-range reading {raw}");
                    last_err = SensorError::OutOfRange;
                }
                Err(e) => last_err = e,
            }
        }

        if good == 0 {
            warn!("SAMPLER: no usable readings in burst ({last_err})");
            return Err(last_err);
        }

        let volts = self.cal.counts_to_volts(sum as f32 / good as f32);
        self.window.write(volts);
        Ok(self.mean())
    }

    /// Mean of the most recent burst averages; NaN before the first one.
    pub fn mean(&self) -> f32 {
        let n = self.window.len().min(self.window_len);
        if n == 0 {
            return f32::NAN;
        }
        let skip = self.window.len() - n;
        let sum: f32 = self.window.oldest_ordered().skip(skip).sum();
        sum / n as f32
    }
}
