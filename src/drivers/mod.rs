//! Actuator and input drivers built on `embedded-hal` digital pins.
//!
//! Drivers are generic over the pin types so the board crate, the host
//! simulator and tests each supply their own.

pub mod button;
pub mod relay;
pub mod status_led;
