//! Test to verify test infrastructure works correctly

mod common;

use common::builders::TimelineBuilder;
use common::mock_helpers::{char_key, create_test_player, create_test_recorder};
use eventplay_rs::config::RecorderSettings;
use eventplay_rs::input::InputStream;
use eventplay_rs::MouseButton;

#[test]
fn test_infrastructure_setup() {
    let timeline = TimelineBuilder::new("setup")
        .move_to(0.0, 1, 2)
        .click(0.1, MouseButton::Left, true)
        .tap(0.2, "b", 0.05)
        .build();

    assert_eq!(timeline.name, "setup");
    assert_eq!(timeline.len(), 4);
    common::assert_float_eq(timeline.duration(), 0.25, 1e-9);
}

#[test]
fn test_mock_harness() {
    let (recorder, source) = create_test_recorder(RecorderSettings::default());
    assert!(!source.emit(char_key('a', true)));
    recorder.start().unwrap();
    assert!(source.is_subscribed(InputStream::Keyboard));
    recorder.stop();

    let (player, injector) = create_test_player();
    assert!(!player.is_playing());
    assert!(injector.is_empty());
}

#[test]
fn test_float_comparison() {
    common::assert_float_eq(1.0, 1.0000001, 0.001);
}

#[test]
#[should_panic]
fn test_float_comparison_fails() {
    common::assert_float_eq(1.0, 2.0, 0.001);
}
