//! # EventPlay-RS: mouse and keyboard recorder/player
//!
//! Captures a timestamped sequence of mouse and keyboard input and replays it
//! against the operating system with the recorded relative timing,
//! optionally looping.
//!
//! ## Architecture
//!
//! - **Input**: [`input::InputSource`] delivers raw OS notifications on
//!   bounded channels; [`input::InputInjector`] performs synthetic input.
//!   Real backends (`rdev`, `enigo`) sit behind the `native` feature.
//! - **Recorder**: one pump thread per input stream converts notifications
//!   into [`Event`]s under a single buffer lock
//! - **Player**: a replay thread per run, cancelled through a channel so a
//!   stop wakes it between events
//! - **Keys**: [`keys`] maps platform-independent key names to native keys
//!   and back, driven by one table
//!
//! ## Configuration
//!
//! Engine tunables live in `config.toml` under the platform data directory
//! (`dev.eventplay.eventplay-rs`); see [`config`].
//!
//! ## Example
//!
//! ```ignore
//! use eventplay_rs::{
//!     config::EngineConfig,
//!     input::{EnigoInjector, RdevSource},
//!     session::{Player, Recorder, Timeline},
//! };
//! use std::sync::Arc;
//!
//! let config = EngineConfig::load_or_default();
//! let recorder = Recorder::new(Arc::new(RdevSource::new()?), config.recorder.clone());
//! recorder.start()?;
//! std::thread::sleep(std::time::Duration::from_secs(5));
//! let timeline = Timeline::from_events(recorder.stop());
//! timeline.save("session.json")?;
//!
//! let player = Player::new(EnigoInjector::new()?, config.player);
//! player.set_timeline(&timeline);
//! player.start()?;
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod keys;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::{EngineConfig, PlayerSettings, RecorderSettings};
pub use error::{EventPlayError, Result};
pub use session::{LoopMode, Player, PlayerState, Recorder, RecorderState, Timeline};
pub use types::{Event, EventKind, EventType, MouseButton};
