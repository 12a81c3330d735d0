//! In-process input backends
//!
//! These backends never touch the operating system:
//!
//! - [`MockInputSource`] lets tests and demos push synthetic notifications
//!   through the same subscription path the real hook uses
//! - [`MockInjector`] records every action with the instant it happened, and
//!   can be told to fail selected actions
//! - [`LogInjector`] logs each action (used for `play --dry-run`)

use crate::error::{EventPlayError, Result};
use crate::keys::NativeKey;
use crate::types::{MouseButton, ScrollAxis};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::{InputInjector, InputSource, InputStream, RawInput};

/// Input source driven by the caller
#[derive(Debug, Default)]
pub struct MockInputSource {
    sinks: Mutex<HashMap<InputStream, Sender<RawInput>>>,
}

impl MockInputSource {
    /// Create a source with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a notification to the subscriber of its stream
    ///
    /// Returns false when nobody is subscribed or the queue is full.
    pub fn emit(&self, input: RawInput) -> bool {
        let stream = InputStream::of(&input);
        let sinks = self.sinks.lock();
        match sinks.get(&stream) {
            Some(sink) => sink.try_send(input).is_ok(),
            None => false,
        }
    }

    /// Whether a stream currently has a subscriber
    pub fn is_subscribed(&self, stream: InputStream) -> bool {
        self.sinks.lock().contains_key(&stream)
    }
}

impl InputSource for MockInputSource {
    fn subscribe(&self, stream: InputStream, sink: Sender<RawInput>) -> Result<()> {
        self.sinks.lock().insert(stream, sink);
        Ok(())
    }

    fn unsubscribe(&self, stream: InputStream) {
        self.sinks.lock().remove(&stream);
    }
}

/// One action performed by an injector
#[derive(Debug, Clone, PartialEq)]
pub enum InjectedAction {
    MoveTo { x: i32, y: i32 },
    Button { button: MouseButton, pressed: bool },
    Scroll { axis: ScrollAxis, amount: i32 },
    Key { key: NativeKey, pressed: bool },
}

/// Injector that records actions instead of performing them
///
/// Clones share the same log, so a test can keep one handle while the player
/// owns the other.
#[derive(Debug, Clone, Default)]
pub struct MockInjector {
    log: Arc<Mutex<Vec<(Instant, InjectedAction)>>>,
    fail_when: Arc<Mutex<Vec<InjectedAction>>>,
}

impl MockInjector {
    /// Create an injector with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future occurrence of `action` fail
    pub fn fail_on(&self, action: InjectedAction) {
        self.fail_when.lock().push(action);
    }

    /// Actions performed so far, in order
    pub fn actions(&self) -> Vec<InjectedAction> {
        self.log.lock().iter().map(|(_, a)| a.clone()).collect()
    }

    /// Actions with the instant each was performed
    pub fn timed_actions(&self) -> Vec<(Instant, InjectedAction)> {
        self.log.lock().clone()
    }

    /// Number of actions performed so far
    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    /// Whether no action has been performed
    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    fn perform(&self, action: InjectedAction) -> Result<()> {
        if self.fail_when.lock().contains(&action) {
            return Err(EventPlayError::InjectionFailure(format!(
                "simulated failure for {:?}",
                action
            )));
        }
        self.log.lock().push((Instant::now(), action));
        Ok(())
    }
}

impl InputInjector for MockInjector {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.perform(InjectedAction::MoveTo { x, y })
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        self.perform(InjectedAction::Button { button, pressed })
    }

    fn scroll(&mut self, axis: ScrollAxis, amount: i32) -> Result<()> {
        self.perform(InjectedAction::Scroll { axis, amount })
    }

    fn key(&mut self, key: NativeKey, pressed: bool) -> Result<()> {
        self.perform(InjectedAction::Key { key, pressed })
    }
}

/// Injector that logs each action at info level and does nothing else
#[derive(Debug, Default)]
pub struct LogInjector {
    count: u64,
}

impl LogInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions logged
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl InputInjector for LogInjector {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.count += 1;
        tracing::info!("[dry-run] move to ({}, {})", x, y);
        Ok(())
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        self.count += 1;
        let action = if pressed { "press" } else { "release" };
        tracing::info!("[dry-run] {} {} button", action, button);
        Ok(())
    }

    fn scroll(&mut self, axis: ScrollAxis, amount: i32) -> Result<()> {
        self.count += 1;
        tracing::info!("[dry-run] scroll {:?} by {}", axis, amount);
        Ok(())
    }

    fn key(&mut self, key: NativeKey, pressed: bool) -> Result<()> {
        self.count += 1;
        let action = if pressed { "press" } else { "release" };
        tracing::info!("[dry-run] {} key {}", action, key);
        Ok(())
    }
}
