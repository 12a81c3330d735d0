//! Timeline player
//!
//! Replays a private copy of a timeline on a dedicated thread, reconstructing
//! the recorded relative timing against a fresh reference instant for every
//! pass.
//!
//! # Cancellation
//!
//! Each run owns a cancel channel. `stop()` raises the run's cancelled flag
//! and drops the channel's sender; the replay thread waits between events
//! with `recv_timeout`, so a disconnected channel wakes it immediately no
//! matter how long the gap to the next event is. `stop()` then waits up to
//! the configured stop timeout for the thread to exit and marks the player
//! idle either way.
//!
//! A generation counter identifies runs: a thread abandoned by a timed-out
//! `stop()` never touches the state of a newer run.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::PlayerSettings;
use crate::error::{EventPlayError, Result};
use crate::input::InputInjector;
use crate::keys::name_to_native;
use crate::types::{Event, EventKind, ScrollAxis};

use super::types::{LoopMode, PlayerState, Timeline};

/// Callback fired when a run ends naturally
pub type CompleteCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback fired for every injection failure
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default, Clone)]
struct Callbacks {
    on_complete: Option<CompleteCallback>,
    on_error: Option<ErrorCallback>,
}

/// Handles of the current (or last) replay thread
struct Run {
    cancelled: Arc<AtomicBool>,
    /// Dropped to wake the replay thread
    cancel: Option<Sender<()>>,
    /// Disconnects when the replay thread exits
    done: Receiver<()>,
    handle: JoinHandle<()>,
}

struct Control {
    state: PlayerState,
    generation: u64,
    run: Option<Run>,
}

/// Replays timelines through an [`InputInjector`]
///
/// All methods take `&self`.
pub struct Player {
    injector: Arc<Mutex<Box<dyn InputInjector>>>,
    settings: PlayerSettings,
    events: Mutex<Arc<Vec<Event>>>,
    loop_mode: Mutex<LoopMode>,
    control: Arc<Mutex<Control>>,
    callbacks: Arc<Mutex<Callbacks>>,
    /// Pass counter of the current or last run
    passes: Mutex<Arc<AtomicU64>>,
}

impl Player {
    /// Create a player that injects through `injector`
    pub fn new<I>(injector: I, settings: PlayerSettings) -> Self
    where
        I: InputInjector + 'static,
    {
        let loop_mode = LoopMode::from_count(settings.default_loop_count);
        Self {
            injector: Arc::new(Mutex::new(Box::new(injector))),
            settings,
            events: Mutex::new(Arc::new(Vec::new())),
            loop_mode: Mutex::new(loop_mode),
            control: Arc::new(Mutex::new(Control {
                state: PlayerState::Idle,
                generation: 0,
                run: None,
            })),
            callbacks: Arc::new(Mutex::new(Callbacks::default())),
            passes: Mutex::new(Arc::new(AtomicU64::new(0))),
        }
    }

    /// Set the callback fired when the loop budget is exhausted
    pub fn set_on_complete<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.lock().on_complete = Some(Arc::new(callback));
    }

    /// Set the callback fired for each injection failure
    pub fn set_on_error<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.lock().on_error = Some(Arc::new(callback));
    }

    /// Take a private copy of `events` for future runs
    ///
    /// Ignored while playing.
    pub fn set_events(&self, events: &[Event]) {
        if self.is_playing() {
            tracing::warn!("set_events ignored while playing");
            return;
        }
        *self.events.lock() = Arc::new(events.to_vec());
    }

    /// Take a private copy of a timeline's events
    pub fn set_timeline(&self, timeline: &Timeline) {
        self.set_events(&timeline.events);
    }

    /// Set the number of passes; zero or negative loops until stopped
    ///
    /// Ignored while playing.
    pub fn set_loop(&self, count: i64) {
        self.set_loop_mode(LoopMode::from_count(count));
    }

    /// Set the loop mode directly
    pub fn set_loop_mode(&self, mode: LoopMode) {
        if self.is_playing() {
            tracing::warn!("set_loop ignored while playing");
            return;
        }
        *self.loop_mode.lock() = mode;
    }

    /// Current loop mode
    pub fn loop_mode(&self) -> LoopMode {
        *self.loop_mode.lock()
    }

    /// Number of events that will be replayed
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Get current state
    pub fn state(&self) -> PlayerState {
        self.control.lock().state
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    /// Passes fully played in the current or last run
    pub fn passes_completed(&self) -> u64 {
        self.passes.lock().load(Ordering::Acquire)
    }

    /// Launch a replay run on its own thread
    ///
    /// Does nothing when already playing or when there are no events.
    pub fn start(&self) -> Result<()> {
        let mut control = self.control.lock();
        if control.state == PlayerState::Playing {
            return Ok(());
        }
        let events = self.events.lock().clone();
        if events.is_empty() {
            tracing::debug!("start ignored: no events");
            return Ok(());
        }

        // A previous run has already left (or was abandoned); detach it.
        control.run = None;
        control.generation += 1;
        let passes = Arc::new(AtomicU64::new(0));
        *self.passes.lock() = passes.clone();

        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let (done_tx, done_rx) = bounded::<()>(0);
        let cancelled = Arc::new(AtomicBool::new(false));

        let replay = Replay {
            generation: control.generation,
            events,
            loop_mode: self.loop_mode(),
            injector: self.injector.clone(),
            cancelled: cancelled.clone(),
            cancel_rx,
            control: self.control.clone(),
            callbacks: self.callbacks.clone(),
            passes,
        };

        let handle = std::thread::Builder::new()
            .name("player".into())
            .spawn(move || {
                let _done = done_tx;
                replay.run();
            })?;

        control.state = PlayerState::Playing;
        control.run = Some(Run {
            cancelled,
            cancel: Some(cancel_tx),
            done: done_rx,
            handle,
        });
        tracing::info!(
            "Playback started ({} events, {:?})",
            self.event_count(),
            self.loop_mode()
        );
        Ok(())
    }

    /// Cancel the current run and wait (bounded) for it to exit
    ///
    /// Does nothing when idle. The player is idle when this returns even if
    /// the replay thread has not exited yet.
    pub fn stop(&self) {
        let run = {
            let mut control = self.control.lock();
            if control.state == PlayerState::Idle {
                return;
            }
            let Some(mut run) = control.run.take() else {
                control.state = PlayerState::Idle;
                return;
            };
            run.cancelled.store(true, Ordering::Release);
            run.cancel.take();
            run
        };

        let timeout = self.settings.stop_timeout();
        match run.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("{}", EventPlayError::PlaybackShutdownTimeout(timeout));
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if run.handle.join().is_err() {
                    tracing::error!("Playback thread panicked");
                }
            }
        }

        self.control.lock().state = PlayerState::Idle;
        tracing::info!("Playback stopped");
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state())
            .field("event_count", &self.event_count())
            .field("loop_mode", &self.loop_mode())
            .finish()
    }
}

/// Everything a replay thread owns
struct Replay {
    generation: u64,
    events: Arc<Vec<Event>>,
    loop_mode: LoopMode,
    injector: Arc<Mutex<Box<dyn InputInjector>>>,
    cancelled: Arc<AtomicBool>,
    cancel_rx: Receiver<()>,
    control: Arc<Mutex<Control>>,
    callbacks: Arc<Mutex<Callbacks>>,
    passes: Arc<AtomicU64>,
}

impl Replay {
    fn run(self) {
        let mut completed = 0u64;
        let mut exhausted = false;
        while !self.is_cancelled() {
            if !self.play_pass() {
                break;
            }
            completed += 1;
            self.passes.store(completed, Ordering::Release);
            if self.loop_mode.is_exhausted(completed) {
                exhausted = true;
                break;
            }
        }

        let natural = exhausted && !self.is_cancelled();
        {
            let mut control = self.control.lock();
            if control.generation == self.generation {
                control.state = PlayerState::Idle;
            }
        }

        tracing::debug!(
            "Replay thread exiting after {} passes (natural: {})",
            completed,
            natural
        );
        if natural {
            let on_complete = self.callbacks.lock().on_complete.clone();
            if let Some(callback) = on_complete {
                callback();
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Play every event once; false when cancelled part-way
    fn play_pass(&self) -> bool {
        let reference = Instant::now();
        for event in self.events.iter() {
            if self.is_cancelled() {
                return false;
            }
            if !self.wait_until(fire_instant(reference, event.timestamp)) {
                return false;
            }

            let result = inject_event(&mut **self.injector.lock(), event);
            if let Err(e) = result {
                let message = format!("Playback error: {}", e);
                tracing::error!("{}", message);
                let on_error = self.callbacks.lock().on_error.clone();
                if let Some(callback) = on_error {
                    callback(&message);
                }
            }
        }
        true
    }

    /// Sleep until `target`; false when woken by cancellation
    fn wait_until(&self, target: Option<Instant>) -> bool {
        let Some(target) = target else {
            // Unreachable deadline: only a stop can end the wait
            let _ = self.cancel_rx.recv();
            return false;
        };
        let now = Instant::now();
        if target <= now {
            return true;
        }
        matches!(
            self.cancel_rx.recv_timeout(target - now),
            Err(RecvTimeoutError::Timeout)
        )
    }
}

fn fire_instant(reference: Instant, timestamp: f64) -> Option<Instant> {
    let offset = Duration::try_from_secs_f64(timestamp.max(0.0)).ok()?;
    reference.checked_add(offset)
}

/// Perform the OS actions for one event
///
/// Events lacking a field their action needs are skipped, as are key names
/// without a native key (logged as a warning). Returns whether anything was
/// injected.
pub fn inject_event(injector: &mut dyn InputInjector, event: &Event) -> Result<bool> {
    match &event.kind {
        EventKind::MouseMove {
            x: Some(x),
            y: Some(y),
        } => {
            injector.move_to(*x, *y)?;
            Ok(true)
        }
        EventKind::MouseClick {
            x: Some(_),
            y: Some(_),
            button: Some(button),
            pressed: Some(pressed),
        } => {
            injector.button(*button, *pressed)?;
            Ok(true)
        }
        EventKind::MouseScroll {
            x: Some(_),
            y: Some(_),
            dx,
            dy,
        } => {
            let mut injected = false;
            if let Some(dy) = dy.filter(|d| *d != 0) {
                injector.scroll(ScrollAxis::Vertical, dy)?;
                injected = true;
            }
            if let Some(dx) = dx.filter(|d| *d != 0) {
                injector.scroll(ScrollAxis::Horizontal, dx)?;
                injected = true;
            }
            Ok(injected)
        }
        EventKind::KeyPress { key: Some(name), .. } => inject_key(injector, name, true),
        EventKind::KeyRelease { key: Some(name), .. } => inject_key(injector, name, false),
        _ => {
            tracing::trace!("Skipping incomplete {} event", event.event_type());
            Ok(false)
        }
    }
}

fn inject_key(injector: &mut dyn InputInjector, name: &str, pressed: bool) -> Result<bool> {
    let Some(key) = name_to_native(name) else {
        tracing::warn!("{}", EventPlayError::UnresolvedKey(name.to_string()));
        return Ok(false);
    };
    injector.key(key, pressed)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InjectedAction, MockInjector};
    use crate::keys::{NativeKey, SpecialKey};
    use crate::types::MouseButton;
    use mockall::mock;
    use std::sync::atomic::AtomicUsize;

    mock! {
        pub FailingInjector {}

        impl InputInjector for FailingInjector {
            fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
            fn button(&mut self, button: MouseButton, pressed: bool) -> Result<()>;
            fn scroll(&mut self, axis: ScrollAxis, amount: i32) -> Result<()>;
            fn key(&mut self, key: NativeKey, pressed: bool) -> Result<()>;
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_inject_skips_incomplete_events() {
        let mut injector = MockInjector::new();
        let no_y = Event::new(0.0, EventKind::MouseMove { x: Some(1), y: None });
        let no_pos = Event::new(
            0.0,
            EventKind::MouseClick {
                x: None,
                y: None,
                button: Some(MouseButton::Left),
                pressed: Some(true),
            },
        );
        let no_key = Event::new(
            0.0,
            EventKind::KeyPress {
                key: None,
                pressed: Some(true),
            },
        );
        assert!(!inject_event(&mut injector, &no_y).unwrap());
        assert!(!inject_event(&mut injector, &no_pos).unwrap());
        assert!(!inject_event(&mut injector, &no_key).unwrap());
        assert!(!inject_event(&mut injector, &Event::key_press(0.0, "banana_key")).unwrap());
        assert!(injector.is_empty());
    }

    #[test]
    fn test_inject_scroll_vertical_then_horizontal() {
        let mut injector = MockInjector::new();
        assert!(inject_event(&mut injector, &Event::mouse_scroll(0.0, 5, 5, 2, -1)).unwrap());
        assert!(!inject_event(&mut injector, &Event::mouse_scroll(0.0, 5, 5, 0, 0)).unwrap());
        assert_eq!(
            injector.actions(),
            vec![
                InjectedAction::Scroll {
                    axis: ScrollAxis::Vertical,
                    amount: -1
                },
                InjectedAction::Scroll {
                    axis: ScrollAxis::Horizontal,
                    amount: 2
                },
            ]
        );
    }

    #[test]
    fn test_inject_key_direction_follows_kind() {
        let mut injector = MockInjector::new();
        inject_event(&mut injector, &Event::key_press(0.0, "Shift_L")).unwrap();
        inject_event(&mut injector, &Event::key_release(0.0, "shift_l")).unwrap();
        let shift = NativeKey::Special(SpecialKey::ShiftL);
        assert_eq!(
            injector.actions(),
            vec![
                InjectedAction::Key {
                    key: shift,
                    pressed: true
                },
                InjectedAction::Key {
                    key: shift,
                    pressed: false
                },
            ]
        );
    }

    #[test]
    fn test_start_with_no_events_is_noop() {
        let player = Player::new(MockInjector::new(), PlayerSettings::default());
        player.start().unwrap();
        assert!(!player.is_playing());
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let player = Player::new(MockInjector::new(), PlayerSettings::default());
        player.stop();
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn test_set_loop_interprets_count() {
        let player = Player::new(MockInjector::new(), PlayerSettings::default());
        assert_eq!(player.loop_mode(), LoopMode::from_count(1));
        player.set_loop(0);
        assert_eq!(player.loop_mode(), LoopMode::Infinite);
        player.set_loop(-1);
        assert_eq!(player.loop_mode(), LoopMode::Infinite);
        player.set_loop(4);
        assert_eq!(player.loop_mode(), LoopMode::from_count(4));
    }

    #[test]
    fn test_player_owns_private_copy() {
        let injector = MockInjector::new();
        let player = Player::new(injector.clone(), PlayerSettings::default());
        let mut events = vec![Event::mouse_move(0.0, 1, 1)];
        player.set_events(&events);
        events.push(Event::mouse_move(0.0, 2, 2));

        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        player.set_on_complete(move || flag.store(true, Ordering::SeqCst));
        player.start().unwrap();
        assert!(wait_for(|| done.load(Ordering::SeqCst)));
        assert_eq!(injector.len(), 1);
    }

    #[test]
    fn test_stop_interrupts_long_wait() {
        let player = Player::new(MockInjector::new(), PlayerSettings::default());
        player.set_events(&[
            Event::mouse_move(0.0, 0, 0),
            Event::mouse_move(3600.0, 1, 1),
        ]);
        player.start().unwrap();
        assert!(player.is_playing());
        std::thread::sleep(Duration::from_millis(20));

        let begin = Instant::now();
        player.stop();
        assert!(begin.elapsed() < Duration::from_millis(500));
        assert!(!player.is_playing());
        assert_eq!(player.passes_completed(), 0);
    }

    #[test]
    fn test_set_events_ignored_while_playing() {
        let player = Player::new(MockInjector::new(), PlayerSettings::default());
        player.set_events(&[Event::mouse_move(0.0, 0, 0), Event::mouse_move(60.0, 1, 1)]);
        player.start().unwrap();
        player.set_events(&[]);
        player.set_loop(7);
        assert_eq!(player.event_count(), 2);
        assert_eq!(player.loop_mode(), LoopMode::from_count(1));
        player.stop();
    }

    #[test]
    fn test_injection_failure_reported_and_pass_continues() {
        let mut injector = MockFailingInjector::new();
        let mut seq = mockall::Sequence::new();
        injector
            .expect_move_to()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(EventPlayError::InjectionFailure("denied".into())));
        injector
            .expect_button()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let player = Player::new(injector, PlayerSettings::default());
        let errors = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = errors.clone();
        player.set_on_error(move |message| sink.lock().push(message.to_string()));
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = completions.clone();
        player.set_on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        player.set_events(&[
            Event::mouse_move(0.0, 1, 1),
            Event::mouse_click(0.01, 1, 1, MouseButton::Left, true),
        ]);
        player.start().unwrap();
        assert!(wait_for(|| completions.load(Ordering::SeqCst) == 1));

        let errors = errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Playback error: "));
        assert!(errors[0].contains("denied"));
    }
}
