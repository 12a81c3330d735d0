//! Timeline file codec
//!
//! Converts between [`Event`]/[`Timeline`] and the JSON record layout of a
//! timeline file:
//!
//! ```json
//! {
//!   "name": "demo",
//!   "created_at": "2026-01-01T12:00:00.000000",
//!   "events": [
//!     { "type": "mouse_move", "timestamp": 0.0, "x": 10, "y": 10 },
//!     { "type": "key_press", "timestamp": 0.1, "key": "a", "pressed": true }
//!   ]
//! }
//! ```
//!
//! Only fields that belong to an event's type are written. On read, `type`
//! and `timestamp` are mandatory, unknown fields are ignored, and an absent
//! (or `null`) optional field stays absent. A field that is present but has
//! the wrong JSON type is an error.

use serde_json::{Map, Value};

use crate::error::{EventPlayError, Result};
use crate::types::{Event, EventKind, EventType, MouseButton};

use super::types::{Timeline, UNTITLED_TIMELINE_NAME};

/// Encode one event as a JSON object
pub fn event_to_record(event: &Event) -> Value {
    let mut record = Map::new();
    record.insert("type".into(), Value::from(event.event_type().as_str()));
    record.insert("timestamp".into(), Value::from(event.timestamp));

    let mut put = |name: &str, value: Option<Value>| {
        if let Some(value) = value {
            record.insert(name.to_string(), value);
        }
    };

    match &event.kind {
        EventKind::MouseMove { x, y } => {
            put("x", x.map(Value::from));
            put("y", y.map(Value::from));
        }
        EventKind::MouseClick {
            x,
            y,
            button,
            pressed,
        } => {
            put("x", x.map(Value::from));
            put("y", y.map(Value::from));
            put("button", button.map(|b| Value::from(b.as_str())));
            put("pressed", pressed.map(Value::from));
        }
        EventKind::MouseScroll { x, y, dx, dy } => {
            put("x", x.map(Value::from));
            put("y", y.map(Value::from));
            put("scroll_dx", dx.map(Value::from));
            put("scroll_dy", dy.map(Value::from));
        }
        EventKind::KeyPress { key, pressed } | EventKind::KeyRelease { key, pressed } => {
            put("key", key.clone().map(Value::from));
            put("pressed", pressed.map(Value::from));
        }
    }

    Value::Object(record)
}

/// Decode one event from a JSON object
pub fn event_from_record(record: &Value) -> Result<Event> {
    let Some(fields) = record.as_object() else {
        return Err(EventPlayError::malformed_event(
            "event",
            format!("expected an object, found {}", json_kind(record)),
        ));
    };

    let event_type = match fields.get("type") {
        None | Some(Value::Null) => {
            return Err(EventPlayError::malformed_event(
                "type",
                "required field is missing",
            ))
        }
        Some(Value::String(name)) => EventType::from_name(name).ok_or_else(|| {
            EventPlayError::malformed_event("type", format!("unknown event type '{}'", name))
        })?,
        Some(other) => {
            return Err(EventPlayError::malformed_event(
                "type",
                format!("expected a string, found {}", json_kind(other)),
            ))
        }
    };

    let timestamp = match fields.get("timestamp") {
        None | Some(Value::Null) => {
            return Err(EventPlayError::malformed_event(
                "timestamp",
                "required field is missing",
            ))
        }
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
            EventPlayError::malformed_event("timestamp", "number is not representable")
        })?,
        Some(other) => {
            return Err(EventPlayError::malformed_event(
                "timestamp",
                format!("expected a number, found {}", json_kind(other)),
            ))
        }
    };

    let kind = match event_type {
        EventType::MouseMove => EventKind::MouseMove {
            x: int_field(fields, "x")?,
            y: int_field(fields, "y")?,
        },
        EventType::MouseClick => EventKind::MouseClick {
            x: int_field(fields, "x")?,
            y: int_field(fields, "y")?,
            button: button_field(fields)?,
            pressed: bool_field(fields, "pressed")?,
        },
        EventType::MouseScroll => EventKind::MouseScroll {
            x: int_field(fields, "x")?,
            y: int_field(fields, "y")?,
            dx: int_field(fields, "scroll_dx")?,
            dy: int_field(fields, "scroll_dy")?,
        },
        EventType::KeyPress => EventKind::KeyPress {
            key: string_field(fields, "key")?,
            pressed: bool_field(fields, "pressed")?,
        },
        EventType::KeyRelease => EventKind::KeyRelease {
            key: string_field(fields, "key")?,
            pressed: bool_field(fields, "pressed")?,
        },
    };

    Ok(Event::new(timestamp, kind))
}

/// Encode a timeline as a JSON object
pub fn timeline_to_record(timeline: &Timeline) -> Value {
    let mut record = Map::new();
    record.insert("name".into(), Value::from(timeline.name.as_str()));
    record.insert("created_at".into(), Value::from(timeline.created_at.as_str()));
    record.insert(
        "events".into(),
        Value::Array(timeline.events.iter().map(event_to_record).collect()),
    );
    Value::Object(record)
}

/// Decode a timeline from a JSON object
///
/// Fails on the first bad event; nothing is returned on failure.
pub fn timeline_from_record(record: &Value) -> Result<Timeline> {
    let Some(fields) = record.as_object() else {
        return Err(EventPlayError::malformed_timeline(
            None,
            format!("expected an object, found {}", json_kind(record)),
        ));
    };

    let events = match fields.get("events") {
        None => {
            return Err(EventPlayError::malformed_timeline(
                None,
                "required field (events) is missing",
            ))
        }
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                event_from_record(item)
                    .map_err(|e| EventPlayError::malformed_timeline(Some(i), e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(EventPlayError::malformed_timeline(
                None,
                format!("events must be an array, found {}", json_kind(other)),
            ))
        }
    };

    let name =
        metadata_field(fields, "name")?.unwrap_or_else(|| UNTITLED_TIMELINE_NAME.to_string());
    let created_at = metadata_field(fields, "created_at")?.unwrap_or_default();

    Ok(Timeline {
        name,
        events,
        created_at,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

/// Screen coordinates and wheel deltas; fractional values are truncated
fn int_field(fields: &Map<String, Value>, name: &str) -> Result<Option<i32>> {
    let Some(value) = present(fields, name) else {
        return Ok(None);
    };
    let number = value.as_f64().ok_or_else(|| {
        EventPlayError::malformed_event(
            name,
            format!("expected a number, found {}", json_kind(value)),
        )
    })?;
    if !number.is_finite() || number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
        return Err(EventPlayError::malformed_event(
            name,
            format!("{} is out of range", number),
        ));
    }
    Ok(Some(number as i32))
}

fn bool_field(fields: &Map<String, Value>, name: &str) -> Result<Option<bool>> {
    match present(fields, name) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(EventPlayError::malformed_event(
            name,
            format!("expected a boolean, found {}", json_kind(other)),
        )),
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match present(fields, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(EventPlayError::malformed_event(
            name,
            format!("expected a string, found {}", json_kind(other)),
        )),
    }
}

fn button_field(fields: &Map<String, Value>) -> Result<Option<MouseButton>> {
    match string_field(fields, "button")? {
        None => Ok(None),
        Some(name) => MouseButton::from_name(&name).map(Some).ok_or_else(|| {
            EventPlayError::malformed_event("button", format!("unknown button '{}'", name))
        }),
    }
}

fn metadata_field(fields: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match present(fields, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(EventPlayError::malformed_timeline(
            None,
            format!("{} must be a string, found {}", name, json_kind(other)),
        )),
    }
}
