//! Host simulation: voltage-profile replay on an in-memory board.
//!
//! ## Profile format
//!
//! One step per line; blank lines and `#` comments are ignored.
//!
//! ```text
//! 12.6            # one tick at 12.6 V
//! 11.5 x100       # 100 ticks at 11.5 V
//! nan x3          # three ticks of failed ADC reads
//! mode 11.8V      # select a cutoff preset (takes effect next tick)
//! press           # short press of the mode button
//! hold            # long press of the mode button
//! ```
//!
//! [`SimHardware`] is the board: a fake ADC driven by the profile voltage,
//! output pins that record their level, and an active-low button.  It
//! hands out the same [`HardwareAdapter`] and [`ButtonDriver`] a real
//! board would use.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::adapters::hardware::HardwareAdapter;
use crate::config::SystemConfig;
use crate::cutoff::CutoffMode;
use crate::drivers::button::ButtonDriver;
use crate::drivers::relay::Relay;
use crate::drivers::status_led::StatusLeds;
use crate::error::{Error, Result, SensorError};
use crate::sensors::AdcChannel;
use crate::sensors::battery::{BatterySampler, Calibration};

/// Ticks the button is held for a `press` step.
pub const PRESS_TICKS: u32 = 3;
/// Ticks the button is held for a `hold` step.
pub const HOLD_TICKS: u32 = 25;

// ───────────────────────────────────────────────────────────────
// Profile
// ───────────────────────────────────────────────────────────────

/// One line of a voltage profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Hold the battery at `volts` for `ticks` ticks.
    Voltage { volts: f32, ticks: u32 },
    /// Select a cutoff preset.
    Mode(CutoffMode),
    /// Hold the mode button down for `ticks` ticks at the current voltage,
    /// then release it for one more tick.
    Press { ticks: u32 },
}

/// A parsed voltage profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    steps: Vec<Step>,
}

impl Profile {
    /// Parse profile text.  The first malformed line is reported by its
    /// 1-based number.
    pub fn parse(text: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let step = parse_step(line).ok_or(Error::Profile { line: idx + 1 })?;
            steps.push(step);
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Control ticks the profile will run for.
    pub fn total_ticks(&self) -> u64 {
        self.steps
            .iter()
            .map(|s| match *s {
                Step::Voltage { ticks, .. } => u64::from(ticks),
                Step::Press { ticks } => u64::from(ticks) + 1,
                Step::Mode(_) => 0,
            })
            .sum()
    }
}

fn parse_step(line: &str) -> Option<Step> {
    let mut words = line.split_whitespace();
    let head = words.next()?;

    let step = match head {
        "mode" => Step::Mode(CutoffMode::from_label(words.next()?)?),
        "press" => Step::Press { ticks: PRESS_TICKS },
        "hold" => Step::Press { ticks: HOLD_TICKS },
        _ => {
            let volts: f32 = head.parse().ok()?;
            let ticks = match words.next() {
                Some(rep) => rep.strip_prefix('x')?.parse().ok()?,
                None => 1,
            };
            if ticks == 0 {
                return None;
            }
            Step::Voltage { volts, ticks }
        }
    };

    // Trailing garbage is an error.
    words.next().is_none().then_some(step)
}

// ───────────────────────────────────────────────────────────────
// Simulated board
// ───────────────────────────────────────────────────────────────

/// ADC that converts the shared battery voltage back to counts.
pub struct SimAdc {
    volts: Rc<Cell<f32>>,
    cal: Calibration,
}

impl AdcChannel for SimAdc {
    fn read_raw(&mut self) -> core::result::Result<u16, SensorError> {
        let volts = self.volts.get();
        if !volts.is_finite() || volts < 0.0 {
            return Err(SensorError::AdcReadFailed);
        }
        let full_scale = self.cal.ref_volts * self.cal.divider_ratio;
        let counts = (volts / full_scale * f32::from(self.cal.adc_max)).round();
        // Above full scale the ADC would saturate; report it past the top
        // so the sampler sees it as out of range.
        Ok(counts.min(f32::from(u16::MAX)) as u16)
    }
}

/// Output pin that records its level.
pub struct SimPin(Rc<Cell<bool>>);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

/// Active-low input pin; `true` in the cell means pressed.
pub struct SimButton(Rc<Cell<bool>>);

impl ErrorType for SimButton {
    type Error = Infallible;
}

impl InputPin for SimButton {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.0.get())
    }
}

/// Hardware adapter wired to a [`SimHardware`] board.
pub type SimAdapter = HardwareAdapter<SimAdc, SimPin, SimPin, SimPin>;

/// In-memory board shared between the simulator and its adapters.
#[derive(Debug, Default, Clone)]
pub struct SimHardware {
    volts: Rc<Cell<f32>>,
    relay: Rc<Cell<bool>>,
    green: Rc<Cell<bool>>,
    red: Rc<Cell<bool>>,
    button: Rc<Cell<bool>>,
}

impl SimHardware {
    pub fn new() -> Self {
        let hw = Self::default();
        hw.volts.set(f32::NAN);
        hw
    }

    /// Build the hardware adapter as the firmware would.
    pub fn adapter(&self, config: &SystemConfig) -> SimAdapter {
        let adc = SimAdc {
            volts: Rc::clone(&self.volts),
            cal: Calibration::from_config(config),
        };
        HardwareAdapter::new(
            BatterySampler::new(adc, config),
            Relay::new(SimPin(Rc::clone(&self.relay))),
            StatusLeds::new(
                SimPin(Rc::clone(&self.green)),
                SimPin(Rc::clone(&self.red)),
            ),
            config,
        )
    }

    pub fn button(&self) -> ButtonDriver<SimButton> {
        ButtonDriver::new(SimButton(Rc::clone(&self.button)))
    }

    pub fn set_volts(&self, volts: f32) {
        self.volts.set(volts);
    }

    pub fn set_button(&self, pressed: bool) {
        self.button.set(pressed);
    }

    /// Relay pin level.
    pub fn relay_closed(&self) -> bool {
        self.relay.get()
    }

    /// `(green, red)` LED pin levels.
    pub fn leds(&self) -> (bool, bool) {
        (self.green.get(), self.red.get())
    }
}
