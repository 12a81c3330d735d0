//! Capture and playback engine
//!
//! This module turns live OS input into timelines and replays timelines as
//! synthetic input.
//!
//! # Features
//!
//! - Record mouse and keyboard input with move throttling and a control-key
//!   exclusion set ([`Recorder`])
//! - Replay with the recorded relative timing, N-times or infinite looping and
//!   prompt cancellation ([`Player`])
//! - Save and load timelines as JSON ([`Timeline::save`], [`Timeline::load`])
//!
//! # Usage
//!
//! ```ignore
//! let recorder = Recorder::new(source, RecorderSettings::default());
//! recorder.start()?;
//! // ...
//! let timeline = Timeline::from_events(recorder.stop());
//!
//! let player = Player::new(injector, PlayerSettings::default());
//! player.set_timeline(&timeline);
//! player.set_loop(3);
//! player.set_on_complete(|| println!("done"));
//! player.start()?;
//! ```

pub mod codec;
pub mod player;
pub mod recorder;
pub mod types;

pub use codec::{event_from_record, event_to_record, timeline_from_record, timeline_to_record};
pub use player::{inject_event, CompleteCallback, ErrorCallback, Player};
pub use recorder::{Capture, EventObserver, Recorder};
pub use types::{
    LoopMode, PlayerState, RecorderState, Timeline, TimelineSummary, NEW_TIMELINE_NAME,
    UNTITLED_TIMELINE_NAME,
};
