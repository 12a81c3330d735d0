//! Integration tests for timeline files
//!
//! These tests validate the file boundary:
//! - Save/load round trips through real files
//! - Malformed files are rejected without a partial timeline
//! - Hand-written files with missing metadata and optional fields

mod common;

use common::builders::{click_and_type_timeline, TimelineBuilder};
use eventplay_rs::{Event, EventKind, EventPlayError, MouseButton, Timeline};
use std::fs;

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let timeline = TimelineBuilder::new("round trip")
        .move_to(0.0, 100, 200)
        .click(0.123456789, MouseButton::Middle, true)
        .scroll(0.2, -1, 3)
        .tap(1.5, "ctrl_l", 0.25)
        .tap(2.0, "?", 0.01)
        .build();
    timeline.save(&path).unwrap();

    let loaded = Timeline::load(&path).unwrap();
    assert_eq!(loaded, timeline);
}

#[test]
fn test_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    click_and_type_timeline().save(&path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["name"], "click and type");
    assert!(value["created_at"].is_string());
    let events = value["events"].as_array().unwrap();
    assert_eq!(events.len(), 5);
    assert_eq!(events[0]["type"], "mouse_move");
    assert_eq!(events[1]["button"], "left");
    assert_eq!(events[1]["pressed"], true);
    assert!(events[0].get("button").is_none());
    assert!(events[3].get("x").is_none());
    assert_eq!(events[4]["key"], "a");
}

#[test]
fn test_missing_events_is_malformed_timeline() {
    let err = Timeline::from_json_str(r#"{"name": "x", "created_at": ""}"#).unwrap_err();
    assert!(matches!(err, EventPlayError::MalformedTimeline { index: None, .. }));
}

#[test]
fn test_missing_timestamp_is_reported_with_index() {
    let json = r#"{
        "events": [
            {"type": "key_press", "timestamp": 0.0, "key": "a", "pressed": true},
            {"type": "key_release", "key": "a", "pressed": false}
        ]
    }"#;
    let err = Timeline::from_json_str(json).unwrap_err();
    match err {
        EventPlayError::MalformedTimeline { index, message } => {
            assert_eq!(index, Some(1));
            assert!(message.contains("timestamp"), "{}", message);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_failed_load_leaves_existing_timeline_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{"events": [{"type": "mouse_move", "timestamp": 0, "x": 1, "y": 1}, {"type": 7, "timestamp": 1}]}"#,
    )
    .unwrap();

    let mut current = click_and_type_timeline();
    let before = current.clone();
    match Timeline::load(&path) {
        Ok(loaded) => current = loaded,
        Err(e) => assert!(e.to_string().contains("[1]"), "{}", e),
    }
    assert_eq!(current, before);
}

#[test]
fn test_hand_written_file_defaults() {
    let json = r#"{
        "events": [
            {"type": "mouse_click", "timestamp": 1, "button": "right", "comment": "ignored"},
            {"type": "mouse_scroll", "timestamp": 1.5, "x": 4, "y": 5, "scroll_dy": -2}
        ]
    }"#;
    let timeline = Timeline::from_json_str(json).unwrap();
    assert_eq!(timeline.name, "Untitled");
    assert_eq!(timeline.created_at, "");
    assert_eq!(
        timeline.events[0],
        Event::new(
            1.0,
            EventKind::MouseClick {
                x: None,
                y: None,
                button: Some(MouseButton::Right),
                pressed: None
            }
        )
    );
    assert_eq!(
        timeline.events[1].kind,
        EventKind::MouseScroll {
            x: Some(4),
            y: Some(5),
            dx: None,
            dy: Some(-2)
        }
    );
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Timeline::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, EventPlayError::WithContext { .. }));
    assert!(err.is_recoverable());
}
