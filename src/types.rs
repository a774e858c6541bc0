//! Core input types - keypress and mouse events, modifiers, key vocabulary.
//!
//! Keypress events carry a key identifier string. Special keys use the names
//! of [`KeyboardEventKeyCode`] (modelled on the browser `KeyboardEvent.key`
//! values); everything else is the literal text of the key (`"a"`, `"A"`, `"é"`).

use std::fmt;
use std::str::FromStr;

// =============================================================================
// KEY IDENTIFIERS
// =============================================================================

/// Wildcard key identifier. Handlers registered under it match every keypress.
pub const WILDCARD_KEY: &str = "@any";

/// Emulated key codes for special keys.
///
/// The string form of each variant is its name, so `KeyboardEventKeyCode::ArrowUp`
/// is the key identifier `"ArrowUp"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardEventKeyCode {
    ArrowUp,
    ArrowDown,
    ArrowRight,
    ArrowLeft,
    PageUp,
    PageDown,
    Enter,
    Escape,
    /// Two Escape presses inside the double-press window.
    EscapeDouble,
    Tab,

    // Editing / navigation cluster
    Backspace,
    Delete,
    Home,
    Insert,
    End,
    /// Keypad 5 without num lock.
    Clear,

    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,

    F0,
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
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
}

impl KeyboardEventKeyCode {
    /// Every key code, in declaration order.
    pub const ALL: [KeyboardEventKeyCode; 47] = {
        use KeyboardEventKeyCode::*;
        [
            ArrowUp, ArrowDown, ArrowRight, ArrowLeft, PageUp, PageDown, Enter, Escape,
            EscapeDouble, Tab, Backspace, Delete, Home, Insert, End, Clear, Numpad0, Numpad1,
            Numpad2, Numpad3, Numpad4, Numpad5, Numpad6, Numpad7, Numpad8, Numpad9, F0, F1, F2,
            F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, F13, F14, F15, F16, F17, F18, F19, F20,
        ]
    };

    /// The key identifier string for this code.
    pub fn as_str(self) -> &'static str {
        use KeyboardEventKeyCode::*;
        match self {
            ArrowUp => "ArrowUp",
            ArrowDown => "ArrowDown",
            ArrowRight => "ArrowRight",
            ArrowLeft => "ArrowLeft",
            PageUp => "PageUp",
            PageDown => "PageDown",
            Enter => "Enter",
            Escape => "Escape",
            EscapeDouble => "EscapeDouble",
            Tab => "Tab",
            Backspace => "Backspace",
            Delete => "Delete",
            Home => "Home",
            Insert => "Insert",
            End => "End",
            Clear => "Clear",
            Numpad0 => "Numpad0",
            Numpad1 => "Numpad1",
            Numpad2 => "Numpad2",
            Numpad3 => "Numpad3",
            Numpad4 => "Numpad4",
            Numpad5 => "Numpad5",
            Numpad6 => "Numpad6",
            Numpad7 => "Numpad7",
            Numpad8 => "Numpad8",
            Numpad9 => "Numpad9",
            F0 => "F0",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            F13 => "F13",
            F14 => "F14",
            F15 => "F15",
            F16 => "F16",
            F17 => "F17",
            F18 => "F18",
            F19 => "F19",
            F20 => "F20",
        }
    }

    /// Function key `F{n}`, for `n` in `0..=20`.
    pub fn function(n: u8) -> Option<Self> {
        use KeyboardEventKeyCode::*;
        const KEYS: [KeyboardEventKeyCode; 21] = [
            F0, F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, F13, F14, F15, F16, F17, F18,
            F19, F20,
        ];
        KEYS.get(n as usize).copied()
    }

    /// Keypad digit `Numpad{n}`, for `n` in `0..=9`.
    pub fn numpad(n: u8) -> Option<Self> {
        use KeyboardEventKeyCode::*;
        const KEYS: [KeyboardEventKeyCode; 10] = [
            Numpad0, Numpad1, Numpad2, Numpad3, Numpad4, Numpad5, Numpad6, Numpad7, Numpad8,
            Numpad9,
        ];
        KEYS.get(n as usize).copied()
    }
}

impl fmt::Display for KeyboardEventKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the emulated key codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyCode(pub String);

impl FromStr for KeyboardEventKeyCode {
    type Err = UnknownKeyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownKeyCode(s.to_string()))
    }
}

// =============================================================================
// MODIFIERS
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Terminals rarely report meta. Some emulate it (xterm modifier bit 8).
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with ctrl
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    /// Create modifiers with alt
    pub fn alt() -> Self {
        Self { alt: true, ..Self::default() }
    }

    /// Create modifiers with shift
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }

    /// Create modifiers with meta
    pub fn meta() -> Self {
        Self { meta: true, ..Self::default() }
    }

    /// True when no modifier is held.
    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.meta)
    }
}

// =============================================================================
// KEYPRESS EVENTS
// =============================================================================

/// A classified keypress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeypressEvent {
    /// Key identifier (e.g. "a", "Enter", "ArrowUp")
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeypressEvent {
    /// Create a key press without modifiers
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), modifiers: Modifiers::default() }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self { key: key.into(), modifiers }
    }

    /// The emulated key code, if the key is a special key.
    pub fn code(&self) -> Option<KeyboardEventKeyCode> {
        self.key.parse().ok()
    }
}

impl From<KeyboardEventKeyCode> for KeypressEvent {
    fn from(code: KeyboardEventKeyCode) -> Self {
        Self::new(code.as_str())
    }
}

/// A keypress together with the raw input it came from.
///
/// `key` is `None` when the input could not be classified; `input` is always
/// the text as received so wildcard listeners can still inspect it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeypressEventRaw {
    pub input: String,
    pub key: Option<String>,
    pub modifiers: Modifiers,
}

impl KeypressEventRaw {
    /// Classified keypress.
    pub fn new(input: impl Into<String>, key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self { input: input.into(), key: Some(key.into()), modifiers }
    }

    /// Input that matched nothing in the key table.
    pub fn unclassified(input: impl Into<String>) -> Self {
        Self { input: input.into(), key: None, modifiers: Modifiers::default() }
    }

    /// The typed view of this event. `None` for unclassified input.
    pub fn to_typed(&self) -> Option<KeypressEvent> {
        self.key
            .as_ref()
            .map(|key| KeypressEvent { key: key.clone(), modifiers: self.modifiers })
    }

    pub fn is_classified(&self) -> bool {
        self.key.is_some()
    }
}

// =============================================================================
// MOUSE EVENTS
// =============================================================================

/// Mouse button, numbered like the browser's `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MouseEventButton {
    /// Usually left
    #[default]
    Main = 0,
    /// Usually the wheel button
    Aux = 1,
    /// Usually right
    Secondary = 2,
}

/// Mouse event type.
///
/// `Down`, `Move` and `Up` must stay 0, 1, 2. `Any` and `Unknown` are
/// subscription sentinels and never describe a decoded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MouseEventType {
    Down = 0,
    Move = 1,
    Up = 2,
    Any = -1,
    Unknown = 99,
}

impl MouseEventType {
    /// Numeric code of this type.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Reverse of [`code`](Self::code). Anything unrecognized is `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Down,
            1 => Self::Move,
            2 => Self::Up,
            -1 => Self::Any,
            _ => Self::Unknown,
        }
    }
}

/// A decoded mouse report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseEvent {
    pub button: MouseEventButton,
    pub kind: MouseEventType,
    /// Column, 0-indexed
    pub client_x: u16,
    /// Row, 0-indexed
    pub client_y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(kind: MouseEventType, button: MouseEventButton, client_x: u16, client_y: u16) -> Self {
        Self { button, kind, client_x, client_y, modifiers: Modifiers::default() }
    }

    /// Create a mouse down event
    pub fn down(button: MouseEventButton, x: u16, y: u16) -> Self {
        Self::new(MouseEventType::Down, button, x, y)
    }

    /// Create a mouse up event
    pub fn up(button: MouseEventButton, x: u16, y: u16) -> Self {
        Self::new(MouseEventType::Up, button, x, y)
    }

    /// Create a mouse move event
    pub fn move_to(x: u16, y: u16) -> Self {
        Self::new(MouseEventType::Move, MouseEventButton::Main, x, y)
    }
}

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// One normalized input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Keypress(KeypressEventRaw),
    Mouse(MouseEvent),
}

impl InputEvent {
    /// Key identifier of a keypress, `None` for mouse or unclassified input.
    pub fn key(&self) -> Option<&str> {
        match self {
            InputEvent::Keypress(event) => event.key.as_deref(),
            InputEvent::Mouse(_) => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
