//! Key Event Registry - handler sets keyed by event identifier.
//!
//! A registry maps an identifier (a key string, or a mouse event type) to the
//! set of handlers subscribed under it. Handler identity is the address of the
//! shared closure, so adding the same handler twice keeps one entry and
//! removing it needs the same `Rc`.
//!
//! Registries are plain values owned by an [`InputContext`](crate::InputContext).
//! Cloning a registry shares the underlying sets; building a new one starts
//! empty. Nothing here is global.
//!
//! # Example
//!
//! ```ignore
//! let registry = KeyEventRegistry::new();
//! let handler = KeyHandler::typed(|event| println!("{}", event.key));
//!
//! registry.add("Enter", handler.clone());
//! registry.add("Enter", handler.clone()); // still one entry
//! assert_eq!(registry.len("Enter"), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::types::{KeypressEvent, KeypressEventRaw, MouseEvent, MouseEventType, WILDCARD_KEY};

// =============================================================================
// HANDLERS
// =============================================================================

/// Stable identity of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

/// Anything that can live in a registry.
pub trait Handler: Clone {
    fn id(&self) -> HandlerId;
}

fn rc_id<T: ?Sized>(rc: &Rc<T>) -> HandlerId {
    HandlerId(Rc::as_ptr(rc) as *const () as usize)
}

/// Keypress handler. The variant decides which form of the event it receives.
#[derive(Clone)]
pub enum KeyHandler {
    /// Receives every matching event, including unclassified input.
    Raw(Rc<dyn Fn(&KeypressEventRaw)>),
    /// Receives the classified key only. Never called for unclassified input.
    Typed(Rc<dyn Fn(&KeypressEvent)>),
}

impl KeyHandler {
    pub fn raw(handler: impl Fn(&KeypressEventRaw) + 'static) -> Self {
        Self::Raw(Rc::new(handler))
    }

    pub fn typed(handler: impl Fn(&KeypressEvent) + 'static) -> Self {
        Self::Typed(Rc::new(handler))
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl Handler for KeyHandler {
    fn id(&self) -> HandlerId {
        match self {
            Self::Raw(f) => rc_id(f),
            Self::Typed(f) => rc_id(f),
        }
    }
}

impl fmt::Debug for KeyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_raw() { "Raw" } else { "Typed" };
        write!(f, "KeyHandler::{kind}({:?})", self.id())
    }
}

/// Mouse event handler.
#[derive(Clone)]
pub struct MouseHandler(pub Rc<dyn Fn(&MouseEvent)>);

impl MouseHandler {
    pub fn new(handler: impl Fn(&MouseEvent) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &MouseEvent) {
        (self.0)(event)
    }
}

impl Handler for MouseHandler {
    fn id(&self) -> HandlerId {
        rc_id(&self.0)
    }
}

impl fmt::Debug for MouseHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MouseHandler({:?})", self.id())
    }
}

// =============================================================================
// KEYS
// =============================================================================

/// Identifier a registry is keyed by.
pub trait RegistryKey: Clone + Eq + Hash + fmt::Debug {
    /// The identifier whose handlers match every event.
    fn wildcard() -> Self;
}

impl RegistryKey for String {
    fn wildcard() -> Self {
        WILDCARD_KEY.to_string()
    }
}

impl RegistryKey for MouseEventType {
    fn wildcard() -> Self {
        MouseEventType::Any
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Shared map from identifier to an insertion-ordered handler set.
pub struct EventRegistry<K, H> {
    sets: Rc<RefCell<HashMap<K, Vec<H>>>>,
}

/// Keypress handlers keyed by key identifier.
pub type KeyEventRegistry = EventRegistry<String, KeyHandler>;

/// Mouse handlers keyed by mouse event type.
pub type MouseEventRegistry = EventRegistry<MouseEventType, MouseHandler>;

impl<K: RegistryKey, H: Handler> EventRegistry<K, H> {
    pub fn new() -> Self {
        Self { sets: Rc::new(RefCell::new(HashMap::new())) }
    }

    /// Create an empty set for `key` if none exists.
    pub fn ensure_key(&self, key: impl Into<K>) {
        self.sets.borrow_mut().entry(key.into()).or_default();
    }

    /// Snapshot of the handlers under `key`. `None` if the key was never used.
    pub fn get<Q>(&self, key: &Q) -> Option<Vec<H>>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sets.borrow().get(key).cloned()
    }

    /// Add `handler` under `key`. Adding a handler that is already present
    /// does nothing.
    pub fn add(&self, key: impl Into<K>, handler: H) {
        let mut sets = self.sets.borrow_mut();
        let set = sets.entry(key.into()).or_default();
        let id = handler.id();
        if !set.iter().any(|h| h.id() == id) {
            set.push(handler);
        }
    }

    /// Remove `handler` from `key`. Absent handlers and keys are ignored.
    pub fn remove<Q>(&self, key: &Q, handler: &H)
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = handler.id();
        if let Some(set) = self.sets.borrow_mut().get_mut(key) {
            set.retain(|h| h.id() != id);
        }
    }

    pub fn contains<Q>(&self, key: &Q, handler: &H) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = handler.id();
        self.sets
            .borrow()
            .get(key)
            .is_some_and(|set| set.iter().any(|h| h.id() == id))
    }

    /// Number of handlers under `key`.
    pub fn len<Q>(&self, key: &Q) -> usize
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sets.borrow().get(key).map_or(0, Vec::len)
    }

    /// True if no handler is registered under any key.
    pub fn is_empty(&self) -> bool {
        self.sets.borrow().values().all(Vec::is_empty)
    }

    /// Handlers under `key` followed by those under the wildcard, each once.
    ///
    /// `None` means the event has no identifier and only the wildcard set
    /// applies. The registry is not borrowed once this returns, so the
    /// handlers may freely subscribe or unsubscribe while running.
    pub fn snapshot(&self, key: Option<&K>) -> Vec<H> {
        let sets = self.sets.borrow();
        let wildcard = K::wildcard();

        let specific = key
            .filter(|k| **k != wildcard)
            .and_then(|k| sets.get(k))
            .into_iter()
            .flatten();
        let any = sets.get(&wildcard).into_iter().flatten();

        let mut out: Vec<H> = Vec::new();
        for handler in specific.chain(any) {
            let id = handler.id();
            if !out.iter().any(|h| h.id() == id) {
                out.push(handler.clone());
            }
        }
        out
    }

    /// True if both values share the same underlying sets.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.sets, &other.sets)
    }
}

impl<K, H> Clone for EventRegistry<K, H> {
    fn clone(&self) -> Self {
        Self { sets: Rc::clone(&self.sets) }
    }
}

impl<K: RegistryKey, H: Handler> Default for EventRegistry<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, H> fmt::Debug for EventRegistry<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets = self.sets.borrow();
        let mut map = f.debug_map();
        for (key, set) in sets.iter() {
            map.entry(key, &set.len());
        }
        map.finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> KeyHandler {
        KeyHandler::typed(|_| {})
    }

    #[test]
    fn test_ensure_key_creates_empty_set() {
        let reg = KeyEventRegistry::new();
        assert!(reg.get("Enter").is_none());

        reg.ensure_key("Enter");
        reg.ensure_key("Enter");
        assert_eq!(reg.get("Enter").map(|s| s.len()), Some(0));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_ensure_key_keeps_existing_handlers() {
        let reg = KeyEventRegistry::new();
        let h = noop();
        reg.add("Enter", h.clone());
        reg.ensure_key("Enter");
        assert!(reg.contains("Enter", &h));
    }

    #[test]
    fn test_add_is_idempotent() {
        let reg = KeyEventRegistry::new();
        let h = noop();
        reg.add("a", h.clone());
        reg.add("a", h.clone());
        assert_eq!(reg.len("a"), 1);

        // Same closure body, different Rc: a different handler
        reg.add("a", noop());
        assert_eq!(reg.len("a"), 2);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let reg = KeyEventRegistry::new();
        let h = noop();
        reg.remove("missing", &h);
        reg.add("a", h.clone());
        reg.remove("a", &noop());
        assert_eq!(reg.len("a"), 1);

        reg.remove("a", &h);
        reg.remove("a", &h);
        assert_eq!(reg.len("a"), 0);
        assert!(!reg.contains("a", &h));
    }

    #[test]
    fn test_snapshot_unions_wildcard_once() {
        let reg = KeyEventRegistry::new();
        let both = noop();
        let only_key = noop();
        let only_any = KeyHandler::raw(|_| {});

        reg.add("ArrowUp", both.clone());
        reg.add("ArrowUp", only_key.clone());
        reg.add(WILDCARD_KEY, both.clone());
        reg.add(WILDCARD_KEY, only_any.clone());

        let ids: Vec<HandlerId> = reg
            .snapshot(Some(&"ArrowUp".to_string()))
            .iter()
            .map(Handler::id)
            .collect();
        assert_eq!(ids, vec![both.id(), only_key.id(), only_any.id()]);
    }

    #[test]
    fn test_snapshot_without_key_is_wildcard_only() {
        let reg = KeyEventRegistry::new();
        reg.add("x", noop());
        let any = KeyHandler::raw(|_| {});
        reg.add(WILDCARD_KEY, any.clone());

        let snap = reg.snapshot(None);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id(), any.id());
    }

    #[test]
    fn test_snapshot_of_wildcard_key_not_doubled() {
        let reg = KeyEventRegistry::new();
        reg.add(WILDCARD_KEY, noop());
        assert_eq!(reg.snapshot(Some(&WILDCARD_KEY.to_string())).len(), 1);
    }

    #[test]
    fn test_clones_share_new_instances_isolate() {
        let a = KeyEventRegistry::new();
        let shared = a.clone();
        let other = KeyEventRegistry::new();

        a.add("q", noop());
        assert_eq!(shared.len("q"), 1);
        assert_eq!(other.len("q"), 0);
        assert!(a.ptr_eq(&shared));
        assert!(!a.ptr_eq(&other));
    }

    #[test]
    fn test_read_accessors_on_both_registries() {
        let keys = KeyEventRegistry::new();
        let h = noop();
        keys.add(String::from("k"), h.clone());
        assert!(keys.get("k").is_some());
        assert!(keys.contains("k", &h));
        assert_eq!(keys.len("k"), 1);
        assert!(!keys.is_empty());

        let mouse = MouseEventRegistry::new();
        let m = MouseHandler::new(|_| {});
        mouse.add(MouseEventType::Up, m.clone());
        assert!(mouse.get(&MouseEventType::Up).is_some());
        assert_eq!(mouse.len(&MouseEventType::Up), 1);
        assert!(!mouse.is_empty());
        assert!(format!("{mouse:?}").contains("Up"));
    }

    #[test]
    fn test_mouse_registry_wildcard() {
        let reg = MouseEventRegistry::new();
        let down = MouseHandler::new(|_| {});
        let any = MouseHandler::new(|_| {});
        reg.add(MouseEventType::Down, down.clone());
        reg.add(MouseEventType::Any, any.clone());

        assert_eq!(reg.snapshot(Some(&MouseEventType::Down)).len(), 2);
        assert_eq!(reg.snapshot(Some(&MouseEventType::Up)).len(), 1);
        assert!(reg.contains(&MouseEventType::Down, &down));
    }
}
