//! Escape sequence table.
//!
//! Maps the terminating bytes of CSI / SS3 sequences to key codes. Sources:
//! xterm ctlseqs (PC-style function keys), the linux console keymap and rxvt's
//! shifted/ctrl variants. Anything not listed here normalizes to an
//! unclassified keypress.

use crate::types::KeyboardEventKeyCode as Code;

use super::parser::{Key, Modifier};

/// `ESC [ <final>` with an optional `1;<mod>` parameter.
pub(crate) fn csi_final(final_byte: u8) -> Option<(Key, Modifier)> {
    let entry = match final_byte {
        b'A' => (Code::ArrowUp, Modifier::empty()),
        b'B' => (Code::ArrowDown, Modifier::empty()),
        b'C' => (Code::ArrowRight, Modifier::empty()),
        b'D' => (Code::ArrowLeft, Modifier::empty()),
        b'E' => (Code::Clear, Modifier::empty()),
        b'F' => (Code::End, Modifier::empty()),
        b'G' => (Code::Clear, Modifier::empty()),
        b'H' => (Code::Home, Modifier::empty()),
        b'P' => (Code::F1, Modifier::empty()),
        b'Q' => (Code::F2, Modifier::empty()),
        b'R' => (Code::F3, Modifier::empty()),
        b'S' => (Code::F4, Modifier::empty()),
        b'Z' => (Code::Tab, Modifier::SHIFT),
        // rxvt shift+arrows
        b'a' => (Code::ArrowUp, Modifier::SHIFT),
        b'b' => (Code::ArrowDown, Modifier::SHIFT),
        b'c' => (Code::ArrowRight, Modifier::SHIFT),
        b'd' => (Code::ArrowLeft, Modifier::SHIFT),
        _ => return None,
    };
    Some((Key::Code(entry.0), entry.1))
}

/// `ESC [ <n> ~` (also `$` / `^` terminated on rxvt).
pub(crate) fn csi_numbered(n: u32) -> Option<Code> {
    let code = match n {
        1 | 7 => Code::Home,
        2 => Code::Insert,
        3 => Code::Delete,
        4 | 8 => Code::End,
        5 => Code::PageUp,
        6 => Code::PageDown,
        10 => Code::F0,
        11 => Code::F1,
        12 => Code::F2,
        13 => Code::F3,
        14 => Code::F4,
        15 => Code::F5,
        17 => Code::F6,
        18 => Code::F7,
        19 => Code::F8,
        20 => Code::F9,
        21 => Code::F10,
        23 => Code::F11,
        24 => Code::F12,
        25 => Code::F13,
        26 => Code::F14,
        28 => Code::F15,
        29 => Code::F16,
        31 => Code::F17,
        32 => Code::F18,
        33 => Code::F19,
        34 => Code::F20,
        _ => return None,
    };
    Some(code)
}

/// Modifier implied by the rxvt terminator of a numbered sequence.
pub(crate) fn numbered_terminator(final_byte: u8) -> Option<Modifier> {
    match final_byte {
        b'~' => Some(Modifier::empty()),
        b'$' => Some(Modifier::SHIFT),
        b'^' => Some(Modifier::CTRL),
        b'@' => Some(Modifier::CTRL | Modifier::SHIFT),
        _ => None,
    }
}

/// Linux console function keys: `ESC [ [ A` .. `ESC [ [ E`.
pub(crate) fn linux_console(final_byte: u8) -> Option<Code> {
    match final_byte {
        b'A'..=b'E' => Code::function(final_byte - b'A' + 1),
        _ => None,
    }
}

/// `ESC O <final>`: cursor keys in application mode, F1-F4, and the keypad.
pub(crate) fn ss3(final_byte: u8) -> Option<(Key, Modifier)> {
    let code = |c: Code| Some((Key::Code(c), Modifier::empty()));
    match final_byte {
        b'A' => code(Code::ArrowUp),
        b'B' => code(Code::ArrowDown),
        b'C' => code(Code::ArrowRight),
        b'D' => code(Code::ArrowLeft),
        b'E' => code(Code::Clear),
        b'F' => code(Code::End),
        b'H' => code(Code::Home),
        b'M' => code(Code::Enter),
        b'P' => code(Code::F1),
        b'Q' => code(Code::F2),
        b'R' => code(Code::F3),
        b'S' => code(Code::F4),
        // rxvt ctrl+arrows
        b'a' => Some((Key::Code(Code::ArrowUp), Modifier::CTRL)),
        b'b' => Some((Key::Code(Code::ArrowDown), Modifier::CTRL)),
        b'c' => Some((Key::Code(Code::ArrowRight), Modifier::CTRL)),
        b'd' => Some((Key::Code(Code::ArrowLeft), Modifier::CTRL)),
        // Application keypad
        b'p'..=b'y' => Code::numpad(final_byte - b'p').map(|c| (Key::Code(c), Modifier::empty())),
        b'j' => Some((Key::Char('*'), Modifier::empty())),
        b'k' => Some((Key::Char('+'), Modifier::empty())),
        b'm' => Some((Key::Char('-'), Modifier::empty())),
        b'n' => Some((Key::Char('.'), Modifier::empty())),
        b'o' => Some((Key::Char('/'), Modifier::empty())),
        _ => None,
    }
}

/// Kitty keyboard protocol functional codepoints that have a key code.
pub(crate) fn kitty_codepoint(codepoint: u32) -> Option<Key> {
    let key = match codepoint {
        9 => Key::Code(Code::Tab),
        13 => Key::Code(Code::Enter),
        27 => Key::Code(Code::Escape),
        127 => Key::Code(Code::Backspace),
        cp => Key::Char(char::from_u32(cp)?),
    };
    Some(key)
}
