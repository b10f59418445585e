//! BatMon — battery voltage supervisor library.
//!
//! Watches a 12 V battery, disconnects the load through a relay when the
//! voltage stays below a selectable cutoff, and tracks whether the engine
//! is charging.  The supervisory core is pure logic behind port traits;
//! hardware and the host simulator plug in as adapters.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod cutoff;
pub mod debounce;
pub mod error;
pub mod fsm;
pub mod monitor;

pub mod adapters;
pub mod drivers;
pub mod sensors;

pub use app::service::AppService;
pub use config::SystemConfig;
pub use cutoff::{CutoffMode, CutoffPolicy};
pub use error::{Error, Result};
pub use fsm::BatMonState;
