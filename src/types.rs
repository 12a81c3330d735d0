//! Core data types for EventPlay-RS
//!
//! This module contains the representation of a single captured input event.
//! Timelines (ordered sequences of events) live in [`crate::session`].
//!
//! # Main Types
//!
//! - [`EventType`] - The closed set of event kinds and their wire names
//! - [`EventKind`] - Tagged payload, one variant per event type
//! - [`Event`] - A payload stamped with seconds since the recording started
//! - [`MouseButton`] / [`ScrollAxis`] - Mouse vocabulary shared by capture and injection
//!
//! # Optional payload fields
//!
//! Each variant only carries the fields that are meaningful for its type, so a
//! mouse move can never hold a key name. Within a variant the fields are still
//! optional: hand-edited or older files may omit them, and playback skips an
//! event whose required fields are absent instead of failing the whole pass.

use std::fmt;

/// Mouse button identity, normalised to the three buttons that can be replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Name used in timeline files
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }

    /// Parse a timeline file button name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(MouseButton::Left),
            "right" => Some(MouseButton::Right),
            "middle" => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scroll direction for a single injected wheel action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

/// The closed set of event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MouseMove,
    MouseClick,
    MouseScroll,
    KeyPress,
    KeyRelease,
}

impl EventType {
    /// All event types, in declaration order
    pub const ALL: [EventType; 5] = [
        EventType::MouseMove,
        EventType::MouseClick,
        EventType::MouseScroll,
        EventType::KeyPress,
        EventType::KeyRelease,
    ];

    /// Wire name (`type` field of an event record)
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::MouseMove => "mouse_move",
            EventType::MouseClick => "mouse_click",
            EventType::MouseScroll => "mouse_scroll",
            EventType::KeyPress => "key_press",
            EventType::KeyRelease => "key_release",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an input event
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Pointer moved to an absolute screen position
    MouseMove { x: Option<i32>, y: Option<i32> },
    /// Button pressed (`pressed == true`) or released at a position
    MouseClick {
        x: Option<i32>,
        y: Option<i32>,
        button: Option<MouseButton>,
        pressed: Option<bool>,
    },
    /// Wheel turned by raw horizontal/vertical deltas (positive `dy` scrolls up)
    MouseScroll {
        x: Option<i32>,
        y: Option<i32>,
        dx: Option<i32>,
        dy: Option<i32>,
    },
    /// Key went down
    KeyPress {
        key: Option<String>,
        pressed: Option<bool>,
    },
    /// Key went up
    KeyRelease {
        key: Option<String>,
        pressed: Option<bool>,
    },
}

impl EventKind {
    /// The tag of this payload
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::MouseMove { .. } => EventType::MouseMove,
            EventKind::MouseClick { .. } => EventType::MouseClick,
            EventKind::MouseScroll { .. } => EventType::MouseScroll,
            EventKind::KeyPress { .. } => EventType::KeyPress,
            EventKind::KeyRelease { .. } => EventType::KeyRelease,
        }
    }
}

/// A single captured input occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Seconds since the start of the recording session
    pub timestamp: f64,
    /// What happened
    pub kind: EventKind,
}

impl Event {
    /// Create an event from a timestamp and payload
    pub fn new(timestamp: f64, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }

    /// Pointer move to `(x, y)`
    pub fn mouse_move(timestamp: f64, x: i32, y: i32) -> Self {
        Self::new(
            timestamp,
            EventKind::MouseMove {
                x: Some(x),
                y: Some(y),
            },
        )
    }

    /// Button press or release at `(x, y)`
    pub fn mouse_click(timestamp: f64, x: i32, y: i32, button: MouseButton, pressed: bool) -> Self {
        Self::new(
            timestamp,
            EventKind::MouseClick {
                x: Some(x),
                y: Some(y),
                button: Some(button),
                pressed: Some(pressed),
            },
        )
    }

    /// Wheel deltas observed at `(x, y)`
    pub fn mouse_scroll(timestamp: f64, x: i32, y: i32, dx: i32, dy: i32) -> Self {
        Self::new(
            timestamp,
            EventKind::MouseScroll {
                x: Some(x),
                y: Some(y),
                dx: Some(dx),
                dy: Some(dy),
            },
        )
    }

    /// Key down for a platform-independent key name
    pub fn key_press(timestamp: f64, key: impl Into<String>) -> Self {
        Self::new(
            timestamp,
            EventKind::KeyPress {
                key: Some(key.into()),
                pressed: Some(true),
            },
        )
    }

    /// Key up for a platform-independent key name
    pub fn key_release(timestamp: f64, key: impl Into<String>) -> Self {
        Self::new(
            timestamp,
            EventKind::KeyRelease {
                key: Some(key.into()),
                pressed: Some(false),
            },
        )
    }

    /// The tag of this event
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Key name for key events
    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            EventKind::KeyPress { key, .. } | EventKind::KeyRelease { key, .. } => key.as_deref(),
            _ => None,
        }
    }
}
