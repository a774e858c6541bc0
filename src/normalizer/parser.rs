//! Escape sequence parser for terminal input.
//!
//! Parses raw stdin bytes into normalized events:
//! - CSI sequences (arrows, Home, End, Insert, Delete, PageUp/Down, F0-F20)
//! - SS3 sequences (application cursor keys, F1-F4, keypad)
//! - SGR and X10 mouse reports
//! - Kitty keyboard protocol (`CSI codepoint ; mods u`)
//! - Alt+key (ESC + key)
//! - Control keys (bytes 0-31, 127)
//!
//! Every consumed byte range becomes exactly one event. Ranges that match
//! nothing in [`sequences`](super::sequences) become unclassified keypresses
//! carrying the raw text. A lone ESC at the end of the buffer waits like any
//! other incomplete sequence, since it may be the first byte of one; flushing
//! it yields the Escape key.

use std::fmt;

use crate::types::{
    InputEvent, KeyboardEventKeyCode as Code, KeypressEventRaw, Modifiers, MouseEvent,
    MouseEventButton, MouseEventType,
};

use super::sequences;

// =============================================================================
// Types
// =============================================================================

bitflags::bitflags! {
    /// Modifier bits as terminals encode them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifier: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const META  = 1 << 3;
    }
}

impl From<Modifier> for Modifiers {
    fn from(m: Modifier) -> Self {
        Modifiers {
            ctrl: m.contains(Modifier::CTRL),
            alt: m.contains(Modifier::ALT),
            shift: m.contains(Modifier::SHIFT),
            meta: m.contains(Modifier::META),
        }
    }
}

/// A recognized key before it is turned into an identifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    Code(Code),
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Code(code) => f.write_str(code.as_str()),
            Key::Char(ch) => write!(f, "{ch}"),
        }
    }
}

enum Decoded {
    Key(Key, Modifier),
    Mouse(MouseEvent),
    Unknown,
}

enum Step {
    /// Bytes consumed and what they decoded to.
    Done(usize, Decoded),
    Incomplete,
}

fn done_key(len: usize, key: Key, modifiers: Modifier) -> Step {
    Step::Done(len, Decoded::Key(key, modifiers))
}

// =============================================================================
// Parser
// =============================================================================

/// Input parser state machine.
pub struct InputParser {
    buf: Vec<u8>,
    mouse: bool,
}

impl InputParser {
    pub fn new(mouse: bool) -> Self {
        Self { buf: Vec::with_capacity(64), mouse }
    }

    /// Parse a byte sequence into events.
    /// Incomplete trailing sequences stay buffered for the next call.
    pub fn parse(&mut self, data: &[u8]) -> Vec<InputEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();

        while !self.buf.is_empty() {
            match decode(&self.buf) {
                Step::Done(len, decoded) => {
                    let len = len.clamp(1, self.buf.len());
                    events.push(self.take_event(len, decoded));
                }
                Step::Incomplete => break,
            }
        }

        events
    }

    /// Check if there's an incomplete sequence waiting for more bytes.
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up on the buffered partial sequence (timeout expired).
    pub fn flush_pending(&mut self) -> Vec<InputEvent> {
        if self.buf.is_empty() {
            return Vec::new();
        }
        let len = self.buf.len();
        let decoded = match self.buf.as_slice() {
            [0x1B] => Decoded::Key(Key::Code(Code::Escape), Modifier::empty()),
            // Alt+O and Alt+[ look like the start of SS3 / CSI
            [0x1B, ch @ 0x20..=0x7E] => {
                let ch = *ch as char;
                Decoded::Key(Key::Char(ch), Modifier::ALT | shift_for(ch))
            }
            _ => Decoded::Unknown,
        };
        vec![self.take_event(len, decoded)]
    }

    fn take_event(&mut self, len: usize, decoded: Decoded) -> InputEvent {
        let input = String::from_utf8_lossy(&self.buf[..len]).into_owned();
        self.buf.drain(..len);

        match decoded {
            Decoded::Key(key, modifiers) => {
                InputEvent::Keypress(KeypressEventRaw::new(input, key.to_string(), modifiers.into()))
            }
            Decoded::Mouse(event) if self.mouse => InputEvent::Mouse(event),
            Decoded::Mouse(_) | Decoded::Unknown => {
                tracing::trace!(input = ?input, "unclassified input");
                InputEvent::Keypress(KeypressEventRaw::unclassified(input))
            }
        }
    }
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new(true)
    }
}

// =============================================================================
// Decoding
// =============================================================================

fn decode(buf: &[u8]) -> Step {
    let first = buf[0];
    match first {
        0x1B => decode_escape(buf),
        0x80..=0xFF => decode_utf8(buf),
        _ => match single_byte(first) {
            Some((key, modifiers)) => done_key(1, key, modifiers),
            None => Step::Done(1, Decoded::Unknown),
        },
    }
}

/// Keys that are a single byte on the wire (everything except ESC and UTF-8 leads).
fn single_byte(byte: u8) -> Option<(Key, Modifier)> {
    let entry = match byte {
        0x00 => (Key::Char(' '), Modifier::CTRL),
        0x08 | 0x7F => (Key::Code(Code::Backspace), Modifier::empty()),
        0x09 => (Key::Code(Code::Tab), Modifier::empty()),
        0x0A | 0x0D => (Key::Code(Code::Enter), Modifier::empty()),
        0x01..=0x1A => (Key::Char((byte + b'a' - 1) as char), Modifier::CTRL),
        0x1C..=0x1F => (Key::Char((byte + 0x40) as char), Modifier::CTRL),
        0x20..=0x7E => {
            let ch = byte as char;
            (Key::Char(ch), shift_for(ch))
        }
        _ => return None,
    };
    Some(entry)
}

fn shift_for(ch: char) -> Modifier {
    if ch.is_ascii_uppercase() { Modifier::SHIFT } else { Modifier::empty() }
}

fn decode_escape(buf: &[u8]) -> Step {
    if buf.len() < 2 {
        return Step::Incomplete;
    }

    match buf[1] {
        b'[' => decode_csi(buf),
        b'O' => decode_ss3(buf),
        // ESC ESC [ .. / ESC ESC O .. → alt-prefixed sequence
        0x1B if buf.len() >= 3 && matches!(buf[2], b'[' | b'O') => {
            match decode_escape(&buf[1..]) {
                Step::Done(len, Decoded::Key(key, modifiers)) => {
                    done_key(len + 1, key, modifiers | Modifier::ALT)
                }
                Step::Done(len, other) => Step::Done(len + 1, other),
                Step::Incomplete => Step::Incomplete,
            }
        }
        // Standalone ESC followed by something that is not a sequence
        0x1B => done_key(1, Key::Code(Code::Escape), Modifier::empty()),
        next => match single_byte(next) {
            Some((key, modifiers)) => done_key(2, key, modifiers | Modifier::ALT),
            None => done_key(1, Key::Code(Code::Escape), Modifier::empty()),
        },
    }
}

fn decode_csi(buf: &[u8]) -> Step {
    // Minimum: ESC [ X (3 bytes)
    if buf.len() < 3 {
        return Step::Incomplete;
    }

    match buf[2] {
        // SGR mouse: ESC [ <
        b'<' => return decode_sgr_mouse(buf),
        // X10 mouse: ESC [ M
        b'M' => return decode_x10_mouse(buf),
        // Linux console: ESC [ [ A
        b'[' => {
            if buf.len() < 4 {
                return Step::Incomplete;
            }
            return match sequences::linux_console(buf[3]) {
                Some(code) => done_key(4, Key::Code(code), Modifier::empty()),
                None => Step::Done(4, Decoded::Unknown),
            };
        }
        _ => {}
    }

    // Find the final byte (0x40-0x7E, or rxvt's '$')
    let Some(end) = buf[2..]
        .iter()
        .position(|&b| (0x40..=0x7E).contains(&b) || b == b'$')
        .map(|i| i + 2)
    else {
        return Step::Incomplete;
    };

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let len = end + 1;

    // Kitty keyboard: final byte is 'u'
    if final_byte == b'u' {
        return decode_kitty_key(len, &params);
    }

    let modifiers = params
        .get(1)
        .map(|p| decode_modifier(p.value))
        .unwrap_or(Modifier::empty());

    if let Some(terminator_mods) = sequences::numbered_terminator(final_byte) {
        let number = params.first().map(|p| p.value).unwrap_or(0);
        return match sequences::csi_numbered(number) {
            Some(code) => done_key(len, Key::Code(code), modifiers | terminator_mods),
            None => Step::Done(len, Decoded::Unknown),
        };
    }

    match sequences::csi_final(final_byte) {
        Some((key, implied)) => done_key(len, key, modifiers | implied),
        None => Step::Done(len, Decoded::Unknown),
    }
}

fn decode_ss3(buf: &[u8]) -> Step {
    if buf.len() < 3 {
        return Step::Incomplete;
    }

    match sequences::ss3(buf[2]) {
        Some((key, modifiers)) => done_key(3, key, modifiers),
        None => Step::Done(3, Decoded::Unknown),
    }
}

fn decode_sgr_mouse(buf: &[u8]) -> Step {
    // ESC [ < Pb ; Px ; Py M/m
    let start = 3;
    let Some(end) = buf[start..]
        .iter()
        .position(|&b| b == b'M' || b == b'm')
        .map(|i| i + start)
    else {
        return Step::Incomplete;
    };

    let is_release = buf[end] == b'm';
    let parts: Vec<u16> = String::from_utf8_lossy(&buf[start..end])
        .split(';')
        .map(|s| s.parse().unwrap_or(0))
        .collect();
    let len = end + 1;

    if parts.len() < 3 {
        return Step::Done(len, Decoded::Unknown);
    }

    // SGR coordinates are 1-indexed
    let x = parts[1].saturating_sub(1);
    let y = parts[2].saturating_sub(1);
    Step::Done(len, decode_mouse_button(parts[0], is_release, x, y))
}

fn decode_x10_mouse(buf: &[u8]) -> Step {
    // ESC [ M Cb Cx Cy (6 bytes)
    if buf.len() < 6 {
        return Step::Incomplete;
    }

    let cb = u16::from(buf[3].saturating_sub(32));
    let x = u16::from(buf[4].saturating_sub(33));
    let y = u16::from(buf[5].saturating_sub(33));

    // X10 reports every release as button 3
    let is_release = cb & 3 == 3 && cb & 32 == 0;
    Step::Done(6, decode_mouse_button(cb, is_release, x, y))
}

fn decode_mouse_button(cb: u16, is_release: bool, x: u16, y: u16) -> Decoded {
    // Wheel reports have no mouse event type
    if cb & 64 != 0 {
        return Decoded::Unknown;
    }

    let mut modifiers = Modifier::empty();
    if cb & 4 != 0 { modifiers |= Modifier::SHIFT; }
    if cb & 8 != 0 { modifiers |= Modifier::ALT; }
    if cb & 16 != 0 { modifiers |= Modifier::CTRL; }

    let button = match cb & 3 {
        1 => MouseEventButton::Aux,
        2 => MouseEventButton::Secondary,
        _ => MouseEventButton::Main,
    };
    let kind = if cb & 32 != 0 {
        MouseEventType::Move
    } else if is_release {
        MouseEventType::Up
    } else {
        MouseEventType::Down
    };

    Decoded::Mouse(MouseEvent {
        button,
        kind,
        client_x: x,
        client_y: y,
        modifiers: modifiers.into(),
    })
}

fn decode_kitty_key(len: usize, params: &[Param]) -> Step {
    let codepoint = params.first().map(|p| p.value).unwrap_or(0);
    let modifiers = params
        .get(1)
        .map(|p| decode_modifier(p.value))
        .unwrap_or(Modifier::empty());

    // Event type sub-parameter: 1 press, 2 repeat, 3 release
    if params.get(1).and_then(|p| p.sub) == Some(3) {
        return Step::Done(len, Decoded::Unknown);
    }

    match sequences::kitty_codepoint(codepoint) {
        Some(key) => done_key(len, key, modifiers),
        None => Step::Done(len, Decoded::Unknown),
    }
}

fn decode_utf8(buf: &[u8]) -> Step {
    let first = buf[0];
    let expected_len = if first & 0xE0 == 0xC0 {
        2
    } else if first & 0xF0 == 0xE0 {
        3
    } else if first & 0xF8 == 0xF0 {
        4
    } else {
        return Step::Done(1, Decoded::Unknown);
    };

    if buf.len() < expected_len {
        return Step::Incomplete;
    }

    match std::str::from_utf8(&buf[..expected_len]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => done_key(expected_len, Key::Char(ch), Modifier::empty()),
        None => Step::Done(1, Decoded::Unknown),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// One `;`-separated CSI parameter with its first `:` sub-parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Param {
    value: u32,
    sub: Option<u32>,
}

fn parse_params(bytes: &[u8]) -> Vec<Param> {
    String::from_utf8_lossy(bytes)
        .split(';')
        .map(|part| {
            let mut fields = part.split(':');
            let value = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let sub = fields.next().and_then(|s| s.parse().ok());
            Param { value, sub }
        })
        .collect()
}

/// Decode CSI modifier parameter (1-based).
fn decode_modifier(param: u32) -> Modifier {
    Modifier::from_bits_truncate(param.saturating_sub(1) as u8)
}

// =============================================================================
// Tests
// =============================================================================
