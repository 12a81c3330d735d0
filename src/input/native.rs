//! Native OS input backends
//!
//! - [`RdevSource`] installs a global `rdev` hook (once per process; the hook
//!   cannot be removed) and fans notifications out to the current subscribers
//! - [`EnigoInjector`] performs synthetic input through `enigo`
//!
//! Only available with the `native` feature. On Linux this needs an X11
//! session; on macOS the process needs the Accessibility permission.

use crate::error::{EventPlayError, Result};
use crate::keys::{NativeKey, SpecialKey};
use crate::types::{MouseButton, ScrollAxis};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use super::{InputInjector, InputSource, InputStream, RawButton, RawInput};

/// How long to wait for the hook thread to report a startup failure
const HOOK_STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Shared state between the hook thread and every `RdevSource` handle
#[derive(Default)]
struct HookHub {
    sinks: Mutex<HashMap<InputStream, Sender<RawInput>>>,
    /// Last pointer position; rdev button/wheel events carry none
    pointer: Mutex<(f64, f64)>,
}

impl HookHub {
    fn dispatch(&self, event: rdev::Event) {
        let input = match event.event_type {
            rdev::EventType::MouseMove { x, y } => {
                *self.pointer.lock() = (x, y);
                RawInput::Move { x, y }
            }
            rdev::EventType::ButtonPress(button) | rdev::EventType::ButtonRelease(button) => {
                let pressed = matches!(event.event_type, rdev::EventType::ButtonPress(_));
                let (x, y) = *self.pointer.lock();
                RawInput::Button {
                    x,
                    y,
                    button: convert_button(button),
                    pressed,
                }
            }
            rdev::EventType::Wheel { delta_x, delta_y } => {
                let (x, y) = *self.pointer.lock();
                RawInput::Wheel {
                    x,
                    y,
                    dx: delta_x,
                    dy: delta_y,
                }
            }
            rdev::EventType::KeyPress(key) => RawInput::Key {
                key: NativeKey::from(key),
                pressed: true,
            },
            rdev::EventType::KeyRelease(key) => RawInput::Key {
                key: NativeKey::from(key),
                pressed: false,
            },
        };

        let stream = InputStream::of(&input);
        let sinks = self.sinks.lock();
        if let Some(sink) = sinks.get(&stream) {
            match sink.try_send(input) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("{} capture queue full, dropping notification", stream);
                }
            }
        }
    }
}

fn convert_button(button: rdev::Button) -> RawButton {
    match button {
        rdev::Button::Left => RawButton::Left,
        rdev::Button::Right => RawButton::Right,
        rdev::Button::Middle => RawButton::Middle,
        rdev::Button::Unknown(code) => RawButton::Other(code),
    }
}

static HOOK: OnceLock<std::result::Result<Arc<HookHub>, String>> = OnceLock::new();

fn install_hook() -> std::result::Result<Arc<HookHub>, String> {
    let hub = Arc::new(HookHub::default());
    let hook_hub = hub.clone();
    let (err_tx, err_rx) = bounded::<String>(1);

    std::thread::Builder::new()
        .name("rdev-hook".into())
        .spawn(move || {
            let result = rdev::listen(move |event| hook_hub.dispatch(event));
            if let Err(e) = result {
                let _ = err_tx.send(format!("{:?}", e));
            }
        })
        .map_err(|e| format!("failed to spawn hook thread: {}", e))?;

    match err_rx.recv_timeout(HOOK_STARTUP_GRACE) {
        Err(RecvTimeoutError::Timeout) => {
            tracing::info!("Global input hook installed");
            Ok(hub)
        }
        Ok(message) => Err(format!("input hook failed: {}", message)),
        Err(RecvTimeoutError::Disconnected) => Err("input hook exited".to_string()),
    }
}

/// Global OS input hook backed by `rdev`
#[derive(Clone)]
pub struct RdevSource {
    hub: Arc<HookHub>,
}

impl RdevSource {
    /// Install (or reuse) the process-wide hook
    pub fn new() -> Result<Self> {
        match HOOK.get_or_init(install_hook) {
            Ok(hub) => Ok(Self { hub: hub.clone() }),
            Err(message) => Err(EventPlayError::Platform(message.clone())),
        }
    }
}

impl InputSource for RdevSource {
    fn subscribe(&self, stream: InputStream, sink: Sender<RawInput>) -> Result<()> {
        self.hub.sinks.lock().insert(stream, sink);
        tracing::debug!("Subscribed to {} notifications", stream);
        Ok(())
    }

    fn unsubscribe(&self, stream: InputStream) {
        self.hub.sinks.lock().remove(&stream);
        tracing::debug!("Unsubscribed from {} notifications", stream);
    }
}

/// Synthetic input through `enigo`
pub struct EnigoInjector {
    enigo: enigo::Enigo,
}

impl EnigoInjector {
    /// Connect to the platform's input facility
    pub fn new() -> Result<Self> {
        let enigo = enigo::Enigo::new(&enigo::Settings::default())
            .map_err(|e| EventPlayError::Platform(format!("failed to create injector: {}", e)))?;
        Ok(Self { enigo })
    }
}

fn injection_error(e: enigo::InputError) -> EventPlayError {
    EventPlayError::InjectionFailure(e.to_string())
}

/// enigo scrolls down for positive vertical lengths; timelines store up as positive
fn scroll_length(axis: ScrollAxis, amount: i32) -> i32 {
    match axis {
        ScrollAxis::Vertical => amount.saturating_neg(),
        ScrollAxis::Horizontal => amount,
    }
}

fn direction(pressed: bool) -> enigo::Direction {
    if pressed {
        enigo::Direction::Press
    } else {
        enigo::Direction::Release
    }
}

/// Raw platform key code (X11 keysym, Windows virtual key)
#[allow(unused_variables)]
fn platform_key(x11: u32, windows: u32) -> Option<enigo::Key> {
    #[cfg(target_os = "windows")]
    {
        Some(enigo::Key::Other(windows))
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Some(enigo::Key::Other(x11))
    }
    #[cfg(target_os = "macos")]
    {
        None
    }
}

fn to_enigo_key(key: NativeKey) -> Option<enigo::Key> {
    use enigo::Key as K;

    let special = match key {
        NativeKey::Char(c) => return Some(K::Unicode(c)),
        NativeKey::Unknown(_) => return None,
        NativeKey::Special(special) => special,
    };

    match special {
        SpecialKey::Space => Some(K::Space),
        SpecialKey::Enter => Some(K::Return),
        SpecialKey::Tab => Some(K::Tab),
        SpecialKey::Backspace => Some(K::Backspace),
        SpecialKey::Delete => Some(K::Delete),
        SpecialKey::Escape => Some(K::Escape),
        SpecialKey::Shift => Some(K::Shift),
        SpecialKey::ShiftL => Some(K::LShift),
        SpecialKey::ShiftR => Some(K::RShift),
        SpecialKey::Ctrl => Some(K::Control),
        SpecialKey::CtrlL => Some(K::LControl),
        SpecialKey::CtrlR => Some(K::RControl),
        SpecialKey::Alt | SpecialKey::AltL => Some(K::Alt),
        SpecialKey::AltR => platform_key(0xffea, 0xa5).or(Some(K::Alt)),
        SpecialKey::AltGr => platform_key(0xfe03, 0xa5).or(Some(K::Alt)),
        SpecialKey::Cmd | SpecialKey::CmdR => Some(K::Meta),
        SpecialKey::CapsLock => Some(K::CapsLock),
        SpecialKey::NumLock => platform_key(0xff7f, 0x90),
        SpecialKey::ScrollLock => platform_key(0xff14, 0x91),
        SpecialKey::PrintScreen => platform_key(0xff61, 0x2c),
        SpecialKey::Pause => platform_key(0xff13, 0x13),
        SpecialKey::Menu => platform_key(0xff67, 0x5d),
        SpecialKey::Up => Some(K::UpArrow),
        SpecialKey::Down => Some(K::DownArrow),
        SpecialKey::Left => Some(K::LeftArrow),
        SpecialKey::Right => Some(K::RightArrow),
        SpecialKey::Home => Some(K::Home),
        SpecialKey::End => Some(K::End),
        SpecialKey::PageUp => Some(K::PageUp),
        SpecialKey::PageDown => Some(K::PageDown),
        SpecialKey::Insert => platform_key(0xff63, 0x2d),
        SpecialKey::F1 => Some(K::F1),
        SpecialKey::F2 => Some(K::F2),
        SpecialKey::F3 => Some(K::F3),
        SpecialKey::F4 => Some(K::F4),
        SpecialKey::F5 => Some(K::F5),
        SpecialKey::F6 => Some(K::F6),
        SpecialKey::F7 => Some(K::F7),
        SpecialKey::F8 => Some(K::F8),
        SpecialKey::F9 => Some(K::F9),
        SpecialKey::F10 => Some(K::F10),
        SpecialKey::F11 => Some(K::F11),
        SpecialKey::F12 => Some(K::F12),
    }
}

impl InputInjector for EnigoInjector {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        use enigo::Mouse;
        self.enigo
            .move_mouse(x, y, enigo::Coordinate::Abs)
            .map_err(injection_error)
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        use enigo::Mouse;
        let button = match button {
            MouseButton::Left => enigo::Button::Left,
            MouseButton::Right => enigo::Button::Right,
            MouseButton::Middle => enigo::Button::Middle,
        };
        self.enigo
            .button(button, direction(pressed))
            .map_err(injection_error)
    }

    fn scroll(&mut self, axis: ScrollAxis, amount: i32) -> Result<()> {
        use enigo::Mouse;
        let length = scroll_length(axis, amount);
        let axis = match axis {
            ScrollAxis::Vertical => enigo::Axis::Vertical,
            ScrollAxis::Horizontal => enigo::Axis::Horizontal,
        };
        self.enigo.scroll(length, axis).map_err(injection_error)
    }

    fn key(&mut self, key: NativeKey, pressed: bool) -> Result<()> {
        use enigo::Keyboard;
        let Some(native) = to_enigo_key(key) else {
            return Err(EventPlayError::UnresolvedKey(format!(
                "{} has no key on this platform",
                key
            )));
        };
        self.enigo
            .key(native, direction(pressed))
            .map_err(injection_error)
    }
}
