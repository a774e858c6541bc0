//! crossterm bridge - convert crossterm events into normalized events.
//!
//! For hosts that read the terminal through crossterm instead of handing raw
//! bytes to [`EventNormalizer::feed`](super::EventNormalizer::feed). crossterm
//! has already decoded the escape sequences, so the `input` of a converted
//! keypress is the key's text for printable keys and empty otherwise.
//!
//! Feed the results through [`EventNormalizer::push`](super::EventNormalizer::push)
//! so Escape-double detection still applies.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers, MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent,
    MouseEventKind,
};

use crate::types::{
    InputEvent, KeyboardEventKeyCode, KeypressEventRaw, Modifiers, MouseEvent, MouseEventButton,
    MouseEventType,
};

/// Convert any crossterm event. Resize, focus and paste events have no
/// counterpart and return `None`.
pub fn convert_event(event: CrosstermEvent) -> Option<InputEvent> {
    match event {
        CrosstermEvent::Key(key) => convert_key_event(key).map(InputEvent::Keypress),
        CrosstermEvent::Mouse(mouse) => convert_mouse_event(mouse).map(InputEvent::Mouse),
        _ => None,
    }
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert a crossterm key event. Only presses produce an event.
pub fn convert_key_event(event: CrosstermKeyEvent) -> Option<KeypressEventRaw> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let mut modifiers = convert_modifiers(event.modifiers);
    let code = match event.code {
        KeyCode::Char(c) => {
            let text = c.to_string();
            return Some(KeypressEventRaw::new(text.clone(), text, modifiers));
        }
        KeyCode::Enter => KeyboardEventKeyCode::Enter,
        KeyCode::Tab => KeyboardEventKeyCode::Tab,
        KeyCode::BackTab => {
            modifiers.shift = true;
            KeyboardEventKeyCode::Tab
        }
        KeyCode::Backspace => KeyboardEventKeyCode::Backspace,
        KeyCode::Delete => KeyboardEventKeyCode::Delete,
        KeyCode::Esc => KeyboardEventKeyCode::Escape,
        KeyCode::Up => KeyboardEventKeyCode::ArrowUp,
        KeyCode::Down => KeyboardEventKeyCode::ArrowDown,
        KeyCode::Left => KeyboardEventKeyCode::ArrowLeft,
        KeyCode::Right => KeyboardEventKeyCode::ArrowRight,
        KeyCode::Home => KeyboardEventKeyCode::Home,
        KeyCode::End => KeyboardEventKeyCode::End,
        KeyCode::PageUp => KeyboardEventKeyCode::PageUp,
        KeyCode::PageDown => KeyboardEventKeyCode::PageDown,
        KeyCode::Insert => KeyboardEventKeyCode::Insert,
        KeyCode::KeypadBegin => KeyboardEventKeyCode::Clear,
        KeyCode::F(n) => match KeyboardEventKeyCode::function(n) {
            Some(code) => code,
            None => return Some(KeypressEventRaw::new("", format!("F{n}"), modifiers)),
        },
        other => {
            tracing::trace!(code = ?other, "unclassified crossterm key");
            return Some(KeypressEventRaw::unclassified(""));
        }
    };

    Some(KeypressEventRaw::new("", code.as_str(), modifiers))
}

// =============================================================================
// MOUSE EVENT CONVERSION
// =============================================================================

/// Convert a crossterm mouse event. Scroll events have no mouse event type.
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> Option<MouseEvent> {
    let (kind, button) = match event.kind {
        MouseEventKind::Down(btn) => (MouseEventType::Down, convert_mouse_button(btn)),
        MouseEventKind::Up(btn) => (MouseEventType::Up, convert_mouse_button(btn)),
        MouseEventKind::Drag(btn) => (MouseEventType::Move, convert_mouse_button(btn)),
        MouseEventKind::Moved => (MouseEventType::Move, MouseEventButton::Main),
        MouseEventKind::ScrollUp
        | MouseEventKind::ScrollDown
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => return None,
    };

    Some(MouseEvent {
        button,
        kind,
        client_x: event.column,
        client_y: event.row,
        modifiers: convert_modifiers(event.modifiers),
    })
}

fn convert_mouse_button(btn: CrosstermMouseButton) -> MouseEventButton {
    match btn {
        CrosstermMouseButton::Left => MouseEventButton::Main,
        CrosstermMouseButton::Middle => MouseEventButton::Aux,
        CrosstermMouseButton::Right => MouseEventButton::Secondary,
    }
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: mods.intersects(KeyModifiers::META | KeyModifiers::SUPER),
    }
}

// =============================================================================
// TESTS
// =============================================================================
