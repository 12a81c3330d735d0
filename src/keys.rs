//! Key-name codec
//!
//! Maps between the platform-independent key names stored in timelines and
//! [`NativeKey`], the engine's view of a physical key. Input backends convert
//! their own key types to and from [`NativeKey`].
//!
//! A single table ([`SPECIAL_KEYS`]) drives both directions, so every special
//! key that can be recorded can also be replayed under the same name.

use std::fmt;

/// Characters accepted as literal keys besides letters and digits
pub const VALID_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:'\",.<>?/~`";

/// Non-printable keys with a canonical name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Space,
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Shift,
    ShiftL,
    ShiftR,
    Ctrl,
    CtrlL,
    CtrlR,
    Alt,
    AltL,
    AltR,
    AltGr,
    Cmd,
    CmdR,
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
    Menu,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// Canonical names of every special key
pub const SPECIAL_KEYS: &[(&str, SpecialKey)] = &[
    ("space", SpecialKey::Space),
    ("enter", SpecialKey::Enter),
    ("tab", SpecialKey::Tab),
    ("backspace", SpecialKey::Backspace),
    ("delete", SpecialKey::Delete),
    ("escape", SpecialKey::Escape),
    ("shift", SpecialKey::Shift),
    ("shift_l", SpecialKey::ShiftL),
    ("shift_r", SpecialKey::ShiftR),
    ("ctrl", SpecialKey::Ctrl),
    ("ctrl_l", SpecialKey::CtrlL),
    ("ctrl_r", SpecialKey::CtrlR),
    ("alt", SpecialKey::Alt),
    ("alt_l", SpecialKey::AltL),
    ("alt_r", SpecialKey::AltR),
    ("alt_gr", SpecialKey::AltGr),
    ("cmd", SpecialKey::Cmd),
    ("cmd_r", SpecialKey::CmdR),
    ("caps_lock", SpecialKey::CapsLock),
    ("num_lock", SpecialKey::NumLock),
    ("scroll_lock", SpecialKey::ScrollLock),
    ("print_screen", SpecialKey::PrintScreen),
    ("pause", SpecialKey::Pause),
    ("menu", SpecialKey::Menu),
    ("up", SpecialKey::Up),
    ("down", SpecialKey::Down),
    ("left", SpecialKey::Left),
    ("right", SpecialKey::Right),
    ("home", SpecialKey::Home),
    ("end", SpecialKey::End),
    ("page_up", SpecialKey::PageUp),
    ("page_down", SpecialKey::PageDown),
    ("insert", SpecialKey::Insert),
    ("f1", SpecialKey::F1),
    ("f2", SpecialKey::F2),
    ("f3", SpecialKey::F3),
    ("f4", SpecialKey::F4),
    ("f5", SpecialKey::F5),
    ("f6", SpecialKey::F6),
    ("f7", SpecialKey::F7),
    ("f8", SpecialKey::F8),
    ("f9", SpecialKey::F9),
    ("f10", SpecialKey::F10),
    ("f11", SpecialKey::F11),
    ("f12", SpecialKey::F12),
];

impl SpecialKey {
    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        SPECIAL_KEYS
            .iter()
            .find(|(_, key)| key == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Look up a canonical name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        SPECIAL_KEYS
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, key)| *key)
    }
}

/// A physical key as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKey {
    /// A named non-printable key
    Special(SpecialKey),
    /// A printable key, identified by its character
    Char(char),
    /// A key the backend reported but could not classify (raw code)
    Unknown(u32),
}

impl fmt::Display for NativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeKey::Special(key) => f.write_str(key.name()),
            NativeKey::Char(c) => write!(f, "{}", c),
            NativeKey::Unknown(code) => write!(f, "<unknown {}>", code),
        }
    }
}

/// Resolve a native key to its timeline name
///
/// Printable keys map to their literal character, special keys to their
/// canonical name. Unclassified keys have no name.
pub fn native_to_name(key: &NativeKey) -> Option<String> {
    match key {
        NativeKey::Special(special) => Some(special.name().to_string()),
        NativeKey::Char(c) => Some(c.to_string()),
        NativeKey::Unknown(_) => None,
    }
}

/// Resolve a timeline key name to a native key
///
/// Matching is case-insensitive. Special names win; otherwise a single
/// alphanumeric character or one of [`VALID_SPECIAL_CHARS`] is accepted and
/// returned lower-cased. Anything else is `None` and should be skipped by the
/// caller.
pub fn name_to_native(name: &str) -> Option<NativeKey> {
    if let Some(special) = SpecialKey::from_name(name) {
        return Some(NativeKey::Special(special));
    }

    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphanumeric() || VALID_SPECIAL_CHARS.contains(c) => {
            Some(NativeKey::Char(c))
        }
        _ => None,
    }
}

/// Whether a key name can be replayed
pub fn is_valid_key_name(name: &str) -> bool {
    name_to_native(name).is_some()
}

#[cfg(feature = "native")]
mod rdev_keys {
    use super::{NativeKey, SpecialKey};

    impl From<rdev::Key> for NativeKey {
        fn from(key: rdev::Key) -> Self {
            use rdev::Key as K;

            let special = |s| NativeKey::Special(s);
            match key {
                K::Space => special(SpecialKey::Space),
                K::Return | K::KpReturn => special(SpecialKey::Enter),
                K::Tab => special(SpecialKey::Tab),
                K::Backspace => special(SpecialKey::Backspace),
                K::Delete | K::KpDelete => special(SpecialKey::Delete),
                K::Escape => special(SpecialKey::Escape),
                K::ShiftLeft => special(SpecialKey::Shift),
                K::ShiftRight => special(SpecialKey::ShiftR),
                K::ControlLeft => special(SpecialKey::CtrlL),
                K::ControlRight => special(SpecialKey::CtrlR),
                K::Alt => special(SpecialKey::AltL),
                K::AltGr => special(SpecialKey::AltGr),
                K::MetaLeft => special(SpecialKey::Cmd),
                K::MetaRight => special(SpecialKey::CmdR),
                K::CapsLock => special(SpecialKey::CapsLock),
                K::NumLock => special(SpecialKey::NumLock),
                K::ScrollLock => special(SpecialKey::ScrollLock),
                K::PrintScreen => special(SpecialKey::PrintScreen),
                K::Pause => special(SpecialKey::Pause),
                K::UpArrow => special(SpecialKey::Up),
                K::DownArrow => special(SpecialKey::Down),
                K::LeftArrow => special(SpecialKey::Left),
                K::RightArrow => special(SpecialKey::Right),
                K::Home => special(SpecialKey::Home),
                K::End => special(SpecialKey::End),
                K::PageUp => special(SpecialKey::PageUp),
                K::PageDown => special(SpecialKey::PageDown),
                K::Insert => special(SpecialKey::Insert),
                K::F1 => special(SpecialKey::F1),
                K::F2 => special(SpecialKey::F2),
                K::F3 => special(SpecialKey::F3),
                K::F4 => special(SpecialKey::F4),
                K::F5 => special(SpecialKey::F5),
                K::F6 => special(SpecialKey::F6),
                K::F7 => special(SpecialKey::F7),
                K::F8 => special(SpecialKey::F8),
                K::F9 => special(SpecialKey::F9),
                K::F10 => special(SpecialKey::F10),
                K::F11 => special(SpecialKey::F11),
                K::F12 => special(SpecialKey::F12),
                K::Unknown(code) => NativeKey::Unknown(code),
                other => match printable_char(other) {
                    Some(c) => NativeKey::Char(c),
                    None => NativeKey::Unknown(0),
                },
            }
        }
    }

    /// Unshifted character of a printable key, so press and release agree
    fn printable_char(key: rdev::Key) -> Option<char> {
        use rdev::Key as K;

        let c = match key {
            K::KeyA => 'a',
            K::KeyB => 'b',
            K::KeyC => 'c',
            K::KeyD => 'd',
            K::KeyE => 'e',
            K::KeyF => 'f',
            K::KeyG => 'g',
            K::KeyH => 'h',
            K::KeyI => 'i',
            K::KeyJ => 'j',
            K::KeyK => 'k',
            K::KeyL => 'l',
            K::KeyM => 'm',
            K::KeyN => 'n',
            K::KeyO => 'o',
            K::KeyP => 'p',
            K::KeyQ => 'q',
            K::KeyR => 'r',
            K::KeyS => 's',
            K::KeyT => 't',
            K::KeyU => 'u',
            K::KeyV => 'v',
            K::KeyW => 'w',
            K::KeyX => 'x',
            K::KeyY => 'y',
            K::KeyZ => 'z',
            K::Num0 | K::Kp0 => '0',
            K::Num1 | K::Kp1 => '1',
            K::Num2 | K::Kp2 => '2',
            K::Num3 | K::Kp3 => '3',
            K::Num4 | K::Kp4 => '4',
            K::Num5 | K::Kp5 => '5',
            K::Num6 | K::Kp6 => '6',
            K::Num7 | K::Kp7 => '7',
            K::Num8 | K::Kp8 => '8',
            K::Num9 | K::Kp9 => '9',
            K::Minus | K::KpMinus => '-',
            K::KpPlus => '+',
            K::KpMultiply => '*',
            K::KpDivide => '/',
            K::Equal => '=',
            K::LeftBracket => '[',
            K::RightBracket => ']',
            K::SemiColon => ';',
            K::Quote => '\'',
            K::BackSlash | K::IntlBackslash => '\\',
            K::Comma => ',',
            K::Dot => '.',
            K::Slash => '/',
            K::BackQuote => '`',
            _ => return None,
        };
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_table_round_trips() {
        for (name, key) in SPECIAL_KEYS {
            let native = name_to_native(name).expect("canonical name resolves");
            assert_eq!(native, NativeKey::Special(*key));
            assert_eq!(native_to_name(&native).as_deref(), Some(*name));
        }
    }

    #[test]
    fn test_special_names_unique() {
        for (i, (a, ka)) in SPECIAL_KEYS.iter().enumerate() {
            for (b, kb) in &SPECIAL_KEYS[i + 1..] {
                assert_ne!(a, b);
                assert_ne!(ka, kb);
            }
        }
    }

    #[test]
    fn test_minimum_table_coverage() {
        let required = [
            "space", "enter", "tab", "backspace", "delete", "escape", "shift", "shift_l",
            "shift_r", "ctrl", "ctrl_l", "ctrl_r", "alt", "alt_l", "alt_r", "alt_gr",
            "caps_lock", "up", "down", "left", "right", "home", "end", "page_up", "page_down",
            "insert",
        ];
        for name in required {
            assert!(SpecialKey::from_name(name).is_some(), "missing {}", name);
        }
        for n in 1..=12 {
            assert!(SpecialKey::from_name(&format!("f{}", n)).is_some());
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            name_to_native("PAGE_UP"),
            Some(NativeKey::Special(SpecialKey::PageUp))
        );
        assert_eq!(name_to_native("F5"), Some(NativeKey::Special(SpecialKey::F5)));
        assert_eq!(name_to_native("A"), Some(NativeKey::Char('a')));
    }

    #[test]
    fn test_literal_characters() {
        assert_eq!(name_to_native("a"), Some(NativeKey::Char('a')));
        assert_eq!(name_to_native("7"), Some(NativeKey::Char('7')));
        assert_eq!(name_to_native("?"), Some(NativeKey::Char('?')));
        assert_eq!(name_to_native("\""), Some(NativeKey::Char('"')));
        assert_eq!(native_to_name(&NativeKey::Char('z')).as_deref(), Some("z"));
    }

    #[test]
    fn test_unresolvable_names() {
        assert_eq!(name_to_native("banana_key"), None);
        assert_eq!(name_to_native(""), None);
        assert_eq!(name_to_native("ab"), None);
        assert_eq!(name_to_native("\t"), None);
        assert!(!is_valid_key_name("banana_key"));
        assert!(is_valid_key_name("enter"));
    }

    #[test]
    fn test_unknown_native_has_no_name() {
        assert_eq!(native_to_name(&NativeKey::Unknown(0xffff)), None);
    }
}
