//! Input recorder
//!
//! # Architecture
//!
//! ```text
//! InputSource ──Mouse──> bounded queue ──> pump thread ─┐
//!             ──Keyboard> bounded queue ──> pump thread ─┼─> Mutex<Shared> (buffer, state)
//!                                                        └─> observer (outside the lock)
//! ```
//!
//! Each pump stamps the notification with the elapsed time while holding the
//! buffer lock, so events from the two streams are appended in timestamp
//! order. The per-notification rules (move throttling, control-key
//! exclusion, button normalisation) live in [`Capture`] and take the elapsed
//! time as an argument.
//!
//! Every session gets a generation number. A pump left behind by a timed-out
//! `stop()` keeps draining its old queue, but its notifications no longer
//! match the current generation and are discarded.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::RecorderSettings;
use crate::error::{EventPlayError, Result};
use crate::input::{InputSource, InputStream, RawInput};
use crate::keys::native_to_name;
use crate::types::Event;

use super::types::RecorderState;

/// Callback invoked with every captured event
pub type EventObserver = Arc<dyn Fn(&Event) + Send + Sync>;

/// Per-notification capture rules
#[derive(Debug, Clone)]
pub struct Capture {
    throttle: Duration,
    excluded: HashSet<String>,
    /// Elapsed time of the last recorded move
    last_move: Option<Duration>,
}

impl Capture {
    /// Create capture rules from recorder settings
    pub fn new(settings: &RecorderSettings) -> Self {
        Self {
            throttle: settings.move_throttle(),
            excluded: settings
                .excluded_keys
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            last_move: None,
        }
    }

    /// Forget the throttle marker (start of a new session)
    pub fn reset(&mut self) {
        self.last_move = None;
    }

    /// Whether a key name is reserved for session control
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    /// Convert one notification observed `elapsed` after the session start
    ///
    /// Returns `None` when the notification is throttled, excluded, or names
    /// a key that cannot be resolved.
    pub fn handle(&mut self, raw: &RawInput, elapsed: Duration) -> Option<Event> {
        let timestamp = elapsed.as_secs_f64();
        match *raw {
            RawInput::Move { x, y } => {
                if let Some(last) = self.last_move {
                    if elapsed.saturating_sub(last) < self.throttle {
                        return None;
                    }
                }
                self.last_move = Some(elapsed);
                Some(Event::mouse_move(timestamp, x as i32, y as i32))
            }
            RawInput::Button {
                x,
                y,
                button,
                pressed,
            } => Some(Event::mouse_click(
                timestamp,
                x as i32,
                y as i32,
                button.normalize(),
                pressed,
            )),
            RawInput::Wheel { x, y, dx, dy } => Some(Event::mouse_scroll(
                timestamp,
                x as i32,
                y as i32,
                saturate(dx),
                saturate(dy),
            )),
            RawInput::Key { ref key, pressed } => {
                let Some(name) = native_to_name(key) else {
                    tracing::trace!("Dropping unresolvable key {}", key);
                    return None;
                };
                if self.is_excluded(&name) {
                    return None;
                }
                Some(if pressed {
                    Event::key_press(timestamp, name)
                } else {
                    Event::key_release(timestamp, name)
                })
            }
        }
    }
}

/// Clamp a wheel delta into `-i32::MAX..=i32::MAX` so it can always be negated
fn saturate(value: i64) -> i32 {
    value.clamp(-i64::from(i32::MAX), i64::from(i32::MAX)) as i32
}

/// State shared between the controller and the pump threads
struct Shared {
    state: RecorderState,
    /// Session number, bumped by every `start()`
    generation: u64,
    start: Instant,
    capture: Capture,
    events: Vec<Event>,
    observer: Option<EventObserver>,
}

impl Shared {
    fn record(
        &mut self,
        generation: u64,
        raw: &RawInput,
    ) -> Option<(Event, Option<EventObserver>)> {
        if self.state != RecorderState::Active || self.generation != generation {
            return None;
        }
        let elapsed = self.start.elapsed();
        let event = self.capture.handle(raw, elapsed)?;
        self.events.push(event.clone());
        Some((event, self.observer.clone()))
    }
}

/// A running pump thread for one stream
struct Pump {
    stream: InputStream,
    handle: JoinHandle<()>,
    /// Disconnects when the pump exits
    done: Receiver<()>,
}

/// Records OS input notifications into a timeline buffer
///
/// All methods take `&self`; the recorder can be shared between a
/// controller and a progress reader.
pub struct Recorder {
    source: Arc<dyn InputSource>,
    settings: RecorderSettings,
    shared: Arc<Mutex<Shared>>,
    /// Serialises start/stop and owns the running pumps
    pumps: Mutex<Vec<Pump>>,
}

impl Recorder {
    /// Create a recorder reading from `source`
    pub fn new(source: Arc<dyn InputSource>, settings: RecorderSettings) -> Self {
        let capture = Capture::new(&settings);
        Self {
            source,
            settings,
            shared: Arc::new(Mutex::new(Shared {
                state: RecorderState::Idle,
                generation: 0,
                start: Instant::now(),
                capture,
                events: Vec::new(),
                observer: None,
            })),
            pumps: Mutex::new(Vec::new()),
        }
    }

    /// Set the per-event observer
    ///
    /// The observer runs on a pump thread and must not block.
    pub fn set_on_event<F>(&self, observer: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.shared.lock().observer = Some(Arc::new(observer));
    }

    /// Get current state
    pub fn state(&self) -> RecorderState {
        self.shared.lock().state
    }

    /// Check if recording
    pub fn is_recording(&self) -> bool {
        self.state() == RecorderState::Active
    }

    /// Number of events captured in the current or last session
    pub fn event_count(&self) -> usize {
        self.shared.lock().events.len()
    }

    /// Time since `start()` while active
    pub fn elapsed(&self) -> Option<Duration> {
        let shared = self.shared.lock();
        (shared.state == RecorderState::Active).then(|| shared.start.elapsed())
    }

    /// Copy of the events captured so far
    pub fn events(&self) -> Vec<Event> {
        self.shared.lock().events.clone()
    }

    /// Start a new session
    ///
    /// Does nothing when already active. On failure the recorder stays idle
    /// and every stream subscribed so far is released.
    pub fn start(&self) -> Result<()> {
        let mut pumps = self.pumps.lock();

        let generation = {
            let mut shared = self.shared.lock();
            if shared.state == RecorderState::Active {
                return Ok(());
            }
            shared.generation += 1;
            shared.events.clear();
            shared.capture.reset();
            shared.start = Instant::now();
            shared.state = RecorderState::Active;
            shared.generation
        };

        for stream in InputStream::ALL {
            if let Err(e) = self.spawn_pump(stream, generation, &mut pumps) {
                self.shared.lock().state = RecorderState::Idle;
                self.shutdown_pumps(&mut pumps);
                return Err(e);
            }
        }

        tracing::info!("Recording started");
        Ok(())
    }

    fn spawn_pump(
        &self,
        stream: InputStream,
        generation: u64,
        pumps: &mut Vec<Pump>,
    ) -> Result<()> {
        let (tx, rx) = bounded::<RawInput>(self.settings.queue_capacity());
        let (done_tx, done_rx) = bounded::<()>(0);
        let shared = self.shared.clone();

        let name = match stream {
            InputStream::Mouse => "recorder-mouse",
            InputStream::Keyboard => "recorder-keyboard",
        };
        let handle = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let _done = done_tx;
                for raw in rx.iter() {
                    let recorded = shared.lock().record(generation, &raw);
                    if let Some((event, Some(observer))) = recorded {
                        observer(&event);
                    }
                }
            })?;

        pumps.push(Pump {
            stream,
            handle,
            done: done_rx,
        });

        if let Err(e) = self.source.subscribe(stream, tx) {
            return Err(e.with_context(format!("Failed to subscribe to {} input", stream)));
        }
        Ok(())
    }

    /// Release every stream and wait (bounded) for its pump to drain
    fn shutdown_pumps(&self, pumps: &mut Vec<Pump>) {
        for pump in pumps.iter() {
            self.source.unsubscribe(pump.stream);
        }

        let timeout = self.settings.listener_stop_timeout();
        for pump in pumps.drain(..) {
            match pump.done.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => {
                    let err = EventPlayError::ListenerShutdownTimeout {
                        stream: pump.stream.to_string(),
                        timeout,
                    };
                    tracing::warn!("{}", err);
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    if pump.handle.join().is_err() {
                        tracing::error!("{} pump thread panicked", pump.stream);
                    }
                }
            }
        }
    }

    /// Stop the session and return a copy of the captured events
    ///
    /// When already idle this returns a copy of the last buffer.
    pub fn stop(&self) -> Vec<Event> {
        let mut pumps = self.pumps.lock();

        if self.state() == RecorderState::Idle {
            return self.events();
        }

        // Queued notifications are still recorded while the pumps drain.
        self.shutdown_pumps(&mut pumps);

        let mut shared = self.shared.lock();
        shared.state = RecorderState::Idle;
        tracing::info!("Recording stopped with {} events", shared.events.len());
        shared.events.clone()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if self.is_recording() {
            self.stop();
        }
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.state())
            .field("event_count", &self.event_count())
            .finish()
    }
}
