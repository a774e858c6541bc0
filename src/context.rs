//! Input context - the registries one UI tree dispatches into.
//!
//! Every [`InputContext`] owns its own keypress and mouse registries plus two
//! reactive signals holding the most recent event of each kind. Clones share
//! all of it; two contexts built with [`InputContext::new`] never see each
//! other's subscriptions.

use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::dispatch;
use crate::registry::{KeyEventRegistry, MouseEventRegistry};
use crate::types::{InputEvent, KeypressEventRaw, MouseEvent};

#[derive(Clone)]
pub struct InputContext {
    keys: KeyEventRegistry,
    mouse: MouseEventRegistry,
    last_keypress: Signal<Option<KeypressEventRaw>>,
    last_mouse: Signal<Option<MouseEvent>>,
    /// Identity shared by all clones.
    token: Rc<()>,
}

impl InputContext {
    pub fn new() -> Self {
        Self {
            keys: KeyEventRegistry::new(),
            mouse: MouseEventRegistry::new(),
            last_keypress: signal(None),
            last_mouse: signal(None),
            token: Rc::new(()),
        }
    }

    pub fn keys(&self) -> &KeyEventRegistry {
        &self.keys
    }

    pub fn mouse(&self) -> &MouseEventRegistry {
        &self.mouse
    }

    /// Most recent keypress dispatched through this context.
    pub fn last_keypress(&self) -> Option<KeypressEventRaw> {
        self.last_keypress.get()
    }

    /// Key identifier of the most recent classified keypress.
    pub fn last_key(&self) -> Option<String> {
        self.last_keypress().and_then(|event| event.key)
    }

    /// Most recent mouse event dispatched through this context.
    pub fn last_mouse(&self) -> Option<MouseEvent> {
        self.last_mouse.get()
    }

    /// The signal behind [`last_keypress`](Self::last_keypress), for deriveds
    /// and effects.
    pub fn last_keypress_signal(&self) -> Signal<Option<KeypressEventRaw>> {
        self.last_keypress.clone()
    }

    pub fn last_mouse_signal(&self) -> Signal<Option<MouseEvent>> {
        self.last_mouse.clone()
    }

    /// Record `event` and deliver it. Returns how many handlers ran.
    pub fn dispatch(&self, event: &InputEvent) -> usize {
        match event {
            InputEvent::Keypress(raw) => self.dispatch_keypress(raw),
            InputEvent::Mouse(mouse) => self.dispatch_mouse(mouse),
        }
    }

    pub fn dispatch_keypress(&self, event: &KeypressEventRaw) -> usize {
        self.last_keypress.set(Some(event.clone()));
        dispatch::dispatch_keypress(&self.keys, event)
    }

    pub fn dispatch_mouse(&self, event: &MouseEvent) -> usize {
        self.last_mouse.set(Some(event.clone()));
        dispatch::dispatch_mouse(&self.mouse, event)
    }

    /// True if `other` is a clone of this context.
    pub fn same_context(&self, other: &InputContext) -> bool {
        Rc::ptr_eq(&self.token, &other.token)
    }
}

impl Default for InputContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InputContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputContext")
            .field("keys", &self.keys)
            .field("mouse", &self.mouse)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::KeyHandler;
    use crate::types::{Modifiers, MouseEventButton};
    use std::cell::Cell;

    #[test]
    fn test_dispatch_records_last_events() {
        let ctx = InputContext::new();
        assert!(ctx.last_keypress().is_none());

        let event = KeypressEventRaw::new("q", "q", Modifiers::none());
        ctx.dispatch(&InputEvent::Keypress(event.clone()));
        assert_eq!(ctx.last_keypress(), Some(event));
        assert_eq!(ctx.last_key().as_deref(), Some("q"));

        let click = MouseEvent::down(MouseEventButton::Main, 3, 4);
        ctx.dispatch(&InputEvent::Mouse(click.clone()));
        assert_eq!(ctx.last_mouse(), Some(click));
    }

    #[test]
    fn test_contexts_are_isolated() {
        let a = InputContext::new();
        let b = InputContext::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        a.keys().add("x", KeyHandler::typed(move |_| c.set(c.get() + 1)));

        let x = KeypressEventRaw::new("x", "x", Modifiers::none());
        assert_eq!(b.dispatch_keypress(&x), 0);
        assert_eq!(a.clone().dispatch_keypress(&x), 1);
        assert_eq!(count.get(), 1);

        assert!(a.same_context(&a.clone()));
        assert!(!a.same_context(&b));
        assert!(b.last_keypress().is_some());
    }
}
