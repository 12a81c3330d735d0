//! Input boundary: OS notification sources and synthetic input injectors
//!
//! The recorder and player never talk to the operating system directly. They
//! go through two traits:
//!
//! - [`InputSource`] - delivers raw mouse/keyboard notifications on a channel
//! - [`InputInjector`] - performs synthetic pointer/key actions
//!
//! # Backends
//!
//! - [`MockInputSource`] / [`MockInjector`] - in-process doubles for tests and demos
//! - [`LogInjector`] - dry-run injector that only logs what it would do
//! - `RdevSource` / `EnigoInjector` - real OS hooks (requires the `native` feature)
//!
//! ```bash
//! cargo run --features native -- record -o session.json
//! ```

pub mod mock;
#[cfg(feature = "native")]
pub mod native;

pub use mock::{InjectedAction, LogInjector, MockInjector, MockInputSource};
#[cfg(feature = "native")]
pub use native::{EnigoInjector, RdevSource};

use crate::error::Result;
use crate::keys::NativeKey;
use crate::types::{MouseButton, ScrollAxis};
use crossbeam_channel::Sender;
use std::fmt;

/// The two notification streams a source can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputStream {
    Mouse,
    Keyboard,
}

impl InputStream {
    /// Both streams, in subscription order
    pub const ALL: [InputStream; 2] = [InputStream::Mouse, InputStream::Keyboard];

    /// Which stream a raw notification belongs to
    pub fn of(input: &RawInput) -> Self {
        match input {
            RawInput::Key { .. } => InputStream::Keyboard,
            _ => InputStream::Mouse,
        }
    }
}

impl fmt::Display for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputStream::Mouse => write!(f, "Mouse"),
            InputStream::Keyboard => write!(f, "Keyboard"),
        }
    }
}

/// Button identity as reported by the OS, before normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawButton {
    Left,
    Right,
    Middle,
    /// Side or extra buttons
    Other(u8),
}

impl RawButton {
    /// Collapse to a replayable button; extra buttons become middle
    pub fn normalize(self) -> MouseButton {
        match self {
            RawButton::Left => MouseButton::Left,
            RawButton::Right => MouseButton::Right,
            RawButton::Middle | RawButton::Other(_) => MouseButton::Middle,
        }
    }
}

/// A single OS input notification
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// Pointer moved (screen coordinates, possibly fractional)
    Move { x: f64, y: f64 },
    /// Button changed state at the current pointer position
    Button {
        x: f64,
        y: f64,
        button: RawButton,
        pressed: bool,
    },
    /// Wheel turned; positive `dy` is up, positive `dx` is right
    Wheel { x: f64, y: f64, dx: i64, dy: i64 },
    /// Key changed state
    Key { key: NativeKey, pressed: bool },
}

/// A source of OS input notifications
///
/// Implementations push every notification for a subscribed stream onto the
/// given sender without blocking (notifications are dropped when the channel
/// is full). `unsubscribe` must drop the sender so the consumer observes
/// disconnection.
pub trait InputSource: Send + Sync {
    /// Start delivering notifications of `stream` to `sink`
    fn subscribe(&self, stream: InputStream, sink: Sender<RawInput>) -> Result<()>;

    /// Stop delivering notifications of `stream`
    fn unsubscribe(&self, stream: InputStream);
}

/// Synthetic input generation
///
/// Each call performs exactly one OS action. Errors are reported per action
/// and never leave the injector unusable.
pub trait InputInjector: Send {
    /// Move the pointer to an absolute screen position
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press or release a mouse button at the current position
    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<()>;

    /// Scroll along one axis (positive vertical is up, positive horizontal is right)
    fn scroll(&mut self, axis: ScrollAxis, amount: i32) -> Result<()>;

    /// Press or release a key
    fn key(&mut self, key: NativeKey, pressed: bool) -> Result<()>;
}

impl<T: InputInjector + ?Sized> InputInjector for Box<T> {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        (**self).move_to(x, y)
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        (**self).button(button, pressed)
    }

    fn scroll(&mut self, axis: ScrollAxis, amount: i32) -> Result<()> {
        (**self).scroll(axis, amount)
    }

    fn key(&mut self, key: NativeKey, pressed: bool) -> Result<()> {
        (**self).key(key, pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_normalization() {
        assert_eq!(RawButton::Left.normalize(), MouseButton::Left);
        assert_eq!(RawButton::Right.normalize(), MouseButton::Right);
        assert_eq!(RawButton::Middle.normalize(), MouseButton::Middle);
        assert_eq!(RawButton::Other(8).normalize(), MouseButton::Middle);
    }

    #[test]
    fn test_stream_of_input() {
        assert_eq!(
            InputStream::of(&RawInput::Move { x: 1.0, y: 2.0 }),
            InputStream::Mouse
        );
        assert_eq!(
            InputStream::of(&RawInput::Key {
                key: NativeKey::Char('a'),
                pressed: true
            }),
            InputStream::Keyboard
        );
    }
}
