//! Polled, debounced mode button with short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  `poll()` is called from the
//! control loop every tick and runs the debounce + gesture state machine
//! against the current pin level.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                 | Event        | Action             |
//! |-------------|---------------------------|--------------|--------------------|
//! | Short press | Release before 2 s        | `ShortPress` | cycle cutoff mode  |
//! | Long press  | Hold >= 2 s               | `LongPress`  | reset to default   |
//!
//! A long press fires while the button is still held; the release that
//! follows is swallowed.

use core::time::Duration;

use embedded_hal::digital::InputPin;

use crate::app::commands::AppCommand;

pub const DEBOUNCE: Duration = Duration::from_millis(50);
pub const LONG_PRESS: Duration = Duration::from_secs(2);

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

impl ButtonEvent {
    /// The application command this gesture maps to.
    pub fn command(self) -> AppCommand {
        match self {
            Self::ShortPress => AppCommand::CycleCutoffMode,
            Self::LongPress => AppCommand::ResetCutoffMode,
        }
    }
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since: Duration },
    Pressed { since: Duration },
    WaitRelease,
}

pub struct ButtonDriver<P> {
    pin: P,
    state: GestureState,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            state: GestureState::Idle,
        }
    }

    /// Call from the main loop at each control tick with the monotonic
    /// time.  Returns a classified gesture event, if any.
    ///
    /// A pin read error counts as released.
    pub fn poll(&mut self, now: Duration) -> Option<ButtonEvent> {
        let down = self.pin.is_low().unwrap_or(false);

        match self.state {
            GestureState::Idle => {
                if down {
                    self.state = GestureState::DebounceWait { since: now };
                }
                None
            }

            GestureState::DebounceWait { since } => {
                if !down {
                    self.state = GestureState::Idle;
                } else if now.saturating_sub(since) >= DEBOUNCE {
                    self.state = GestureState::Pressed { since };
                }
                None
            }

            GestureState::Pressed { since } => {
                if !down {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                if now.saturating_sub(since) >= LONG_PRESS {
                    self.state = GestureState::WaitRelease;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            GestureState::WaitRelease => {
                if !down {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(
            self.state,
            GestureState::Pressed { .. } | GestureState::WaitRelease
        )
    }
}
