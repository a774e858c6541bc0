//! Dispatcher - deliver one normalized event to its handlers.
//!
//! Handlers are snapshotted before any of them runs: the set registered under
//! the event's key, then the wildcard set, each handler once. The registry is
//! not borrowed while handlers execute, so a handler may subscribe or
//! unsubscribe anything, itself included. Changes made during a dispatch take
//! effect from the next one.

use crate::registry::{KeyEventRegistry, KeyHandler, MouseEventRegistry};
use crate::types::{KeypressEventRaw, MouseEvent};

/// Deliver a keypress. Returns how many handlers were invoked.
///
/// Raw handlers receive `event` as is. Typed handlers receive its classified
/// form and are skipped when the input could not be classified.
pub fn dispatch_keypress(registry: &KeyEventRegistry, event: &KeypressEventRaw) -> usize {
    let handlers = registry.snapshot(event.key.as_ref());
    if handlers.is_empty() {
        tracing::trace!(key = ?event.key, "no keypress handlers");
        return 0;
    }

    let typed = event.to_typed();
    let mut invoked = 0;
    for handler in &handlers {
        match handler {
            KeyHandler::Raw(f) => {
                f(event);
                invoked += 1;
            }
            KeyHandler::Typed(f) => {
                if let Some(typed) = &typed {
                    f(typed);
                    invoked += 1;
                }
            }
        }
    }

    tracing::debug!(key = ?event.key, invoked, "keypress dispatched");
    invoked
}

/// Deliver a mouse event to handlers for its type and for `Any`.
pub fn dispatch_mouse(registry: &MouseEventRegistry, event: &MouseEvent) -> usize {
    let handlers = registry.snapshot(Some(&event.kind));
    for handler in &handlers {
        handler.call(event);
    }

    if !handlers.is_empty() {
        tracing::debug!(kind = ?event.kind, invoked = handlers.len(), "mouse dispatched");
    }
    handlers.len()
}

// =============================================================================
// TESTS
// =============================================================================
