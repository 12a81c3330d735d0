//! Session data types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::Path;

use crate::error::{EventPlayError, Result, ResultExt};
use crate::types::{Event, EventType};

use super::codec;

/// Name given to a freshly created timeline
pub const NEW_TIMELINE_NAME: &str = "New Timeline";

/// Name given to a loaded timeline that has none
pub const UNTITLED_TIMELINE_NAME: &str = "Untitled";

/// State of the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    /// Subscribed to OS input and appending events
    Active,
}

/// State of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    /// A replay thread is running
    Playing,
}

/// How many passes the player makes over a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Repeat until stopped
    Infinite,
    /// Exactly this many full passes
    Times(NonZeroU32),
}

impl Default for LoopMode {
    fn default() -> Self {
        LoopMode::Times(NonZeroU32::MIN)
    }
}

impl LoopMode {
    /// Interpret a user-facing loop count: zero or negative means infinite
    pub fn from_count(count: i64) -> Self {
        if count <= 0 {
            return LoopMode::Infinite;
        }
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        NonZeroU32::new(count)
            .map(LoopMode::Times)
            .unwrap_or(LoopMode::Infinite)
    }

    /// Whether `completed` passes exhaust the budget
    pub fn is_exhausted(&self, completed: u64) -> bool {
        match self {
            LoopMode::Infinite => false,
            LoopMode::Times(n) => completed >= u64::from(n.get()),
        }
    }
}

/// Counts derived from a timeline for display
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSummary {
    /// Total number of events
    pub event_count: usize,
    /// Timestamp of the last event (seconds)
    pub duration: f64,
    /// Event count per type (types with no events are omitted)
    pub per_type: BTreeMap<&'static str, usize>,
}

impl std::fmt::Display for TimelineSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} events | {:.1}s", self.event_count, self.duration)
    }
}

/// An ordered, named sequence of captured events
///
/// Insertion order is replay order.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    /// Free-form label
    pub name: String,
    /// Events in replay order
    pub events: Vec<Event>,
    /// Opaque creation timestamp (ISO-8601 for timelines created here)
    pub created_at: String,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Create an empty timeline stamped with the current local time
    pub fn new() -> Self {
        Self {
            name: NEW_TIMELINE_NAME.to_string(),
            events: Vec::new(),
            created_at: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        }
    }

    /// Wrap the events returned by a recording session
    pub fn from_events(events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::new()
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Timestamp of the last event, or zero when empty
    pub fn duration(&self) -> f64 {
        self.events.last().map(|e| e.timestamp).unwrap_or(0.0)
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the timeline is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Counts for display
    pub fn summary(&self) -> TimelineSummary {
        let mut per_type = BTreeMap::new();
        for event in &self.events {
            *per_type.entry(event.event_type().as_str()).or_insert(0) += 1;
        }
        TimelineSummary {
            event_count: self.events.len(),
            duration: self.duration(),
            per_type,
        }
    }

    /// Number of events of one type
    pub fn count_of(&self, event_type: EventType) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    /// Encode as pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&codec::timeline_to_record(self))?)
    }

    /// Decode from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            EventPlayError::malformed_timeline(None, format!("invalid JSON: {}", e))
        })?;
        codec::timeline_from_record(&value)
    }

    /// Save to a UTF-8 JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        std::fs::write(path, json)
            .map_err(EventPlayError::from)
            .with_context(|| format!("Failed to write timeline {:?}", path))?;
        tracing::info!("Saved {} events to {:?}", self.events.len(), path);
        Ok(())
    }

    /// Load from a UTF-8 JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(EventPlayError::from)
            .with_context(|| format!("Failed to read timeline {:?}", path))?;
        let timeline = Self::from_json_str(&json)?;
        tracing::info!("Loaded {} events from {:?}", timeline.events.len(), path);
        Ok(timeline)
    }
}

impl Serialize for Timeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        codec::timeline_to_record(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timeline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        codec::timeline_from_record(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MouseButton;

    #[test]
    fn test_timeline_duration() {
        let mut timeline = Timeline::new();
        assert!(timeline.is_empty());
        assert_eq!(timeline.duration(), 0.0);

        timeline.events.push(Event::mouse_move(0.0, 1, 1));
        timeline.events.push(Event::key_press(1.25, "a"));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.duration(), 1.25);
    }

    #[test]
    fn test_new_timeline_metadata() {
        let timeline = Timeline::new();
        assert_eq!(timeline.name, NEW_TIMELINE_NAME);
        assert!(!timeline.created_at.is_empty());
        assert!(chrono::NaiveDateTime::parse_from_str(
            &timeline.created_at,
            "%Y-%m-%dT%H:%M:%S%.f"
        )
        .is_ok());
    }

    #[test]
    fn test_summary() {
        let timeline = Timeline::from_events(vec![
            Event::mouse_move(0.0, 1, 1),
            Event::mouse_click(0.1, 1, 1, MouseButton::Left, true),
            Event::mouse_click(0.2, 1, 1, MouseButton::Left, false),
            Event::key_press(0.3, "a"),
        ]);
        let summary = timeline.summary();
        assert_eq!(summary.event_count, 4);
        assert_eq!(summary.per_type.get("mouse_click"), Some(&2));
        assert_eq!(summary.per_type.get("mouse_scroll"), None);
        assert_eq!(summary.to_string(), "4 events | 0.3s");
        assert_eq!(timeline.count_of(EventType::KeyPress), 1);
    }

    #[test]
    fn test_loop_mode_from_count() {
        assert_eq!(LoopMode::from_count(0), LoopMode::Infinite);
        assert_eq!(LoopMode::from_count(-4), LoopMode::Infinite);
        assert_eq!(
            LoopMode::from_count(3),
            LoopMode::Times(NonZeroU32::new(3).unwrap())
        );
        assert_eq!(LoopMode::default(), LoopMode::from_count(1));

        let three = LoopMode::from_count(3);
        assert!(!three.is_exhausted(2));
        assert!(three.is_exhausted(3));
        assert!(!LoopMode::Infinite.is_exhausted(u64::MAX));
    }

    #[test]
    fn test_json_string_round_trip() {
        let timeline = Timeline::from_events(vec![Event::mouse_scroll(0.5, 10, 20, 0, -2)])
            .with_name("scroll");
        let json = timeline.to_json_string().unwrap();
        let loaded = Timeline::from_json_str(&json).unwrap();
        assert_eq!(loaded, timeline);
    }

    #[test]
    fn test_invalid_json_is_malformed_timeline() {
        let err = Timeline::from_json_str("{not json").unwrap_err();
        assert!(matches!(
            err,
            EventPlayError::MalformedTimeline { index: None, .. }
        ));
    }

    #[test]
    fn test_serde_impl_delegates_to_codec() {
        let timeline = Timeline::from_events(vec![Event::key_release(0.25, "enter")]);
        let value = serde_json::to_value(&timeline).unwrap();
        assert_eq!(value["events"][0]["type"], "key_release");
        let back: Timeline = serde_json::from_value(value).unwrap();
        assert_eq!(back, timeline);
    }
}
