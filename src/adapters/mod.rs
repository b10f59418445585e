//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                 | Connects to                 |
//! |------------|----------------------------|-----------------------------|
//! | `hardware` | SamplerPort, ActuatorPort  | ADC, relay and LED GPIOs    |
//! | `log_sink` | EventSink                  | `log` facade                |
//! | `time`     | ClockPort                  | `Instant` / simulated clock |
//! | `sim`      | —                          | in-memory board for replay  |

pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
