//! Mock construction helpers

use eventplay_rs::config::{PlayerSettings, RecorderSettings};
use eventplay_rs::input::{MockInjector, MockInputSource, RawInput};
use eventplay_rs::keys::NativeKey;
use eventplay_rs::session::{Player, Recorder};
use std::sync::Arc;

/// Recorder wired to a mock source the test can drive
pub fn create_test_recorder(settings: RecorderSettings) -> (Recorder, Arc<MockInputSource>) {
    let source = Arc::new(MockInputSource::new());
    let recorder = Recorder::new(source.clone(), settings);
    (recorder, source)
}

/// Player wired to a mock injector the test can inspect
pub fn create_test_player() -> (Player, MockInjector) {
    let injector = MockInjector::new();
    let player = Player::new(injector.clone(), PlayerSettings::default());
    (player, injector)
}

pub fn key_input(key: NativeKey, pressed: bool) -> RawInput {
    RawInput::Key { key, pressed }
}

pub fn char_key(c: char, pressed: bool) -> RawInput {
    key_input(NativeKey::Char(c), pressed)
}
