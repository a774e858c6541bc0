//! Subscription Manager - component-scoped input subscriptions.
//!
//! Subscriptions are made while a component is being built, inside
//! [`construct`]. The innermost [`ComponentInstance`] supplies the
//! [`InputContext`] to register into and the [`LifecycleHooks`] that decide
//! when the handler is attached and detached:
//!
//! - at subscribe time the keys are ensured in the registry
//! - the handler is added when the component's attach hook fires
//! - it is removed when the detach hook fires or the [`RemoveListener`] runs
//!
//! Outside of [`construct`] every subscribe call returns an inert remover.
//!
//! # Example
//!
//! ```ignore
//! let ctx = InputContext::new();
//! let component = Component::new(&ctx);
//!
//! component.setup(|| {
//!     on_key(["ArrowUp", "ArrowDown"], |event| move_selection(&event.key));
//!     on_keypress(|raw| log_input(&raw.input));
//! });
//! component.mount();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::context::InputContext;
use crate::registry::{KeyHandler, MouseHandler};
use crate::types::{
    KeyboardEventKeyCode, KeypressEvent, KeypressEventRaw, MouseEvent, MouseEventType,
    WILDCARD_KEY,
};

// =============================================================================
// LIFECYCLE
// =============================================================================

type HookFn = Rc<dyn Fn(Box<dyn FnOnce()>)>;

/// The two lifecycle callbacks a component host provides.
///
/// Each receives a callback to run when the component attaches to (or detaches
/// from) the live tree.
#[derive(Clone)]
pub struct LifecycleHooks {
    on_attach: HookFn,
    on_detach: HookFn,
}

impl LifecycleHooks {
    pub fn new(
        on_attach: impl Fn(Box<dyn FnOnce()>) + 'static,
        on_detach: impl Fn(Box<dyn FnOnce()>) + 'static,
    ) -> Self {
        Self {
            on_attach: Rc::new(on_attach),
            on_detach: Rc::new(on_detach),
        }
    }

    /// Hooks that run attach callbacks immediately and never detach.
    pub fn immediate() -> Self {
        Self::new(|attach| attach(), |_| {})
    }

    fn on_attach(&self, callback: impl FnOnce() + 'static) {
        (self.on_attach)(Box::new(callback))
    }

    fn on_detach(&self, callback: impl FnOnce() + 'static) {
        (self.on_detach)(Box::new(callback))
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LifecycleHooks")
    }
}

/// A component under construction.
#[derive(Clone, Debug)]
pub struct ComponentInstance {
    pub context: InputContext,
    pub hooks: LifecycleHooks,
}

impl ComponentInstance {
    pub fn new(context: InputContext, hooks: LifecycleHooks) -> Self {
        Self { context, hooks }
    }
}

// =============================================================================
// CONSTRUCTION STACK
// =============================================================================

thread_local! {
    /// Components currently being built, innermost last.
    static CONSTRUCTION_STACK: RefCell<Vec<ComponentInstance>> = const { RefCell::new(Vec::new()) };
}

/// Pops the construction stack even if the build closure panics.
struct ConstructionGuard;

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Run `build` with `instance` as the component under construction.
///
/// Calls nest: inside a nested `construct` the inner instance is current, and
/// the outer one is current again once it returns.
pub fn construct<R>(instance: ComponentInstance, build: impl FnOnce() -> R) -> R {
    CONSTRUCTION_STACK.with(|stack| stack.borrow_mut().push(instance));
    let _guard = ConstructionGuard;
    build()
}

/// The innermost component under construction, if any.
pub fn current_instance() -> Option<ComponentInstance> {
    CONSTRUCTION_STACK.with(|stack| stack.borrow().last().cloned())
}

pub fn is_constructing() -> bool {
    CONSTRUCTION_STACK.with(|stack| !stack.borrow().is_empty())
}

// =============================================================================
// REMOVE LISTENER
// =============================================================================

struct Subscription {
    removed: Cell<bool>,
    attach: Box<dyn Fn()>,
    detach: Box<dyn Fn()>,
}

/// Undoes one subscription.
///
/// Calling [`remove`](Self::remove) detaches the handler and keeps a later
/// attach hook from adding it back. Every call after the first does nothing,
/// and all clones share the same state.
#[derive(Clone, Default)]
pub struct RemoveListener {
    inner: Option<Rc<Subscription>>,
}

impl RemoveListener {
    /// A remover that does nothing, returned outside of construction.
    pub fn noop() -> Self {
        Self { inner: None }
    }

    pub fn remove(&self) {
        if let Some(sub) = &self.inner {
            if !sub.removed.replace(true) {
                (sub.detach)();
            }
        }
    }

    /// False for inert removers and once `remove` has run.
    pub fn is_active(&self) -> bool {
        self.inner.as_ref().is_some_and(|sub| !sub.removed.get())
    }
}

impl fmt::Debug for RemoveListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveListener")
            .field("noop", &self.inner.is_none())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Wire `attach`/`detach` into the current component's lifecycle.
fn subscribe(
    instance: &ComponentInstance,
    attach: impl Fn() + 'static,
    detach: impl Fn() + 'static,
) -> RemoveListener {
    let sub = Rc::new(Subscription {
        removed: Cell::new(false),
        attach: Box::new(attach),
        detach: Box::new(detach),
    });

    let on_attach = Rc::clone(&sub);
    instance.hooks.on_attach(move || {
        if !on_attach.removed.get() {
            (on_attach.attach)();
        }
    });

    let on_detach = Rc::clone(&sub);
    instance.hooks.on_detach(move || (on_detach.detach)());

    RemoveListener { inner: Some(sub) }
}

// =============================================================================
// KEY LISTS
// =============================================================================

/// A single key identifier.
pub trait IntoKey {
    fn into_key(self) -> String;
}

impl IntoKey for &str {
    fn into_key(self) -> String {
        self.to_string()
    }
}

impl IntoKey for String {
    fn into_key(self) -> String {
        self
    }
}

impl IntoKey for &String {
    fn into_key(self) -> String {
        self.clone()
    }
}

impl IntoKey for KeyboardEventKeyCode {
    fn into_key(self) -> String {
        self.as_str().to_string()
    }
}

/// One or more key identifiers.
pub trait IntoKeys {
    fn into_keys(self) -> Vec<String>;
}

impl IntoKeys for &str {
    fn into_keys(self) -> Vec<String> {
        vec![self.into_key()]
    }
}

impl IntoKeys for String {
    fn into_keys(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoKeys for &String {
    fn into_keys(self) -> Vec<String> {
        vec![self.into_key()]
    }
}

impl IntoKeys for KeyboardEventKeyCode {
    fn into_keys(self) -> Vec<String> {
        vec![self.into_key()]
    }
}

impl<T: IntoKey, const N: usize> IntoKeys for [T; N] {
    fn into_keys(self) -> Vec<String> {
        self.into_iter().map(IntoKey::into_key).collect()
    }
}

impl<T: IntoKey + Clone, const N: usize> IntoKeys for &[T; N] {
    fn into_keys(self) -> Vec<String> {
        self.iter().cloned().map(IntoKey::into_key).collect()
    }
}

impl<T: IntoKey + Clone> IntoKeys for &[T] {
    fn into_keys(self) -> Vec<String> {
        self.iter().cloned().map(IntoKey::into_key).collect()
    }
}

impl<T: IntoKey> IntoKeys for Vec<T> {
    fn into_keys(self) -> Vec<String> {
        self.into_iter().map(IntoKey::into_key).collect()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe `handler` under each of `keys` for the current component.
pub fn subscribe_key_handler(keys: impl IntoKeys, handler: KeyHandler) -> RemoveListener {
    let Some(instance) = current_instance() else {
        tracing::debug!("key subscription outside component construction ignored");
        return RemoveListener::noop();
    };

    let mut unique: Vec<String> = Vec::new();
    for key in keys.into_keys() {
        if !unique.contains(&key) {
            unique.push(key);
        }
    }
    let keys = unique;
    let registry = instance.context.keys().clone();
    for key in &keys {
        registry.ensure_key(key.as_str());
    }

    let attach = {
        let (registry, keys, handler) = (registry.clone(), keys.clone(), handler.clone());
        move || {
            for key in &keys {
                registry.add(key.as_str(), handler.clone());
            }
        }
    };
    let detach = move || {
        for key in &keys {
            registry.remove(key.as_str(), &handler);
        }
    };

    subscribe(&instance, attach, detach)
}

/// Receive every keypress, classified or not.
pub fn on_keypress(handler: impl Fn(&KeypressEventRaw) + 'static) -> RemoveListener {
    subscribe_key_handler(WILDCARD_KEY, KeyHandler::raw(handler))
}

/// Receive keypresses for the given key or keys.
///
/// ```ignore
/// on_key("Enter", |_| submit());
/// on_key(KeyboardEventKeyCode::Escape, |_| close());
/// on_key(["ArrowUp", "ArrowDown"], |event| step(&event.key));
/// ```
pub fn on_key(keys: impl IntoKeys, handler: impl Fn(&KeypressEvent) + 'static) -> RemoveListener {
    subscribe_key_handler(keys, KeyHandler::typed(handler))
}

/// Receive mouse events of `kind`, or all of them with [`MouseEventType::Any`].
pub fn on_mouse(kind: MouseEventType, handler: impl Fn(&MouseEvent) + 'static) -> RemoveListener {
    let Some(instance) = current_instance() else {
        tracing::debug!(?kind, "mouse subscription outside component construction ignored");
        return RemoveListener::noop();
    };

    let registry = instance.context.mouse().clone();
    let handler = MouseHandler::new(handler);
    registry.ensure_key(kind);

    let attach = {
        let (registry, handler) = (registry.clone(), handler.clone());
        move || registry.add(kind, handler.clone())
    };
    let detach = move || registry.remove(&kind, &handler);

    subscribe(&instance, attach, detach)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Modifiers;

    type Queue = Rc<RefCell<Vec<Box<dyn FnOnce()>>>>;

    /// Hooks that queue callbacks so the test decides when they run.
    fn queued_hooks() -> (LifecycleHooks, Queue, Queue) {
        let attach: Queue = Rc::default();
        let detach: Queue = Rc::default();
        let (a, d) = (attach.clone(), detach.clone());
        let hooks = LifecycleHooks::new(
            move |cb| a.borrow_mut().push(cb),
            move |cb| d.borrow_mut().push(cb),
        );
        (hooks, attach, detach)
    }

    fn run(queue: &Queue) {
        let callbacks: Vec<_> = queue.borrow_mut().drain(..).collect();
        for cb in callbacks {
            cb();
        }
    }

    fn press(key: &str) -> KeypressEventRaw {
        KeypressEventRaw::new(key, key, Modifiers::none())
    }

    #[test]
    fn test_outside_construction_is_noop() {
        assert!(!is_constructing());
        let remover = on_key("Enter", |_| {});
        assert!(!remover.is_active());
        remover.remove();
        remover.remove();

        let remover = on_mouse(MouseEventType::Down, |_| {});
        assert!(!remover.is_active());
    }

    #[test]
    fn test_keys_ensured_at_subscribe_attached_on_hook() {
        let ctx = InputContext::new();
        let (hooks, attach, _detach) = queued_hooks();

        let remover = construct(ComponentInstance::new(ctx.clone(), hooks), || {
            on_key(["ArrowUp", "ArrowDown"], |_| {})
        });

        assert_eq!(ctx.keys().get("ArrowUp").map(|s| s.len()), Some(0));
        assert_eq!(ctx.keys().get("ArrowDown").map(|s| s.len()), Some(0));

        run(&attach);
        assert_eq!(ctx.keys().len("ArrowUp"), 1);
        assert_eq!(ctx.keys().len("ArrowDown"), 1);
        assert!(remover.is_active());
    }

    #[test]
    fn test_detach_hook_removes_handler() {
        let ctx = InputContext::new();
        let (hooks, attach, detach) = queued_hooks();

        construct(ComponentInstance::new(ctx.clone(), hooks), || {
            on_keypress(|_| {});
        });
        run(&attach);
        assert_eq!(ctx.keys().len(WILDCARD_KEY), 1);

        run(&detach);
        assert_eq!(ctx.keys().len(WILDCARD_KEY), 0);
        assert_eq!(ctx.dispatch_keypress(&press("a")), 0);
    }

    #[test]
    fn test_remove_is_idempotent_and_blocks_late_attach() {
        let ctx = InputContext::new();
        let (hooks, attach, _detach) = queued_hooks();

        let remover = construct(ComponentInstance::new(ctx.clone(), hooks), || {
            on_key("q", |_| {})
        });
        let copy = remover.clone();
        remover.remove();
        copy.remove();
        assert!(!copy.is_active());

        run(&attach);
        assert_eq!(ctx.keys().len("q"), 0);
    }

    #[test]
    fn test_independent_subscriptions() {
        let ctx = InputContext::new();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let (h1, h2) = (hits.clone(), hits.clone());
        let (first, _second) = construct(
            ComponentInstance::new(ctx.clone(), LifecycleHooks::immediate()),
            || {
                (
                    on_key("x", move |_| h1.borrow_mut().push("first")),
                    on_key("x", move |_| h2.borrow_mut().push("second")),
                )
            },
        );

        first.remove();
        ctx.dispatch_keypress(&press("x"));
        assert_eq!(*hits.borrow(), vec!["second"]);
    }

    #[test]
    fn test_nested_construction_uses_innermost() {
        let outer = InputContext::new();
        let inner = InputContext::new();

        construct(ComponentInstance::new(outer.clone(), LifecycleHooks::immediate()), || {
            construct(ComponentInstance::new(inner.clone(), LifecycleHooks::immediate()), || {
                on_key("i", |_| {});
            });
            on_key("o", |_| {});
        });

        assert_eq!(inner.keys().len("i"), 1);
        assert_eq!(inner.keys().len("o"), 0);
        assert_eq!(outer.keys().len("o"), 1);
        assert!(!is_constructing());
    }

    #[test]
    fn test_repeated_keys_subscribe_once() {
        let ctx = InputContext::new();
        let (hooks, attach, detach) = queued_hooks();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        construct(ComponentInstance::new(ctx.clone(), hooks), || {
            on_key(["a", "b", "a"], move |_| c.set(c.get() + 1));
        });
        run(&attach);

        assert_eq!(ctx.keys().len("a"), 1);
        assert_eq!(ctx.dispatch_keypress(&press("a")), 1);
        assert_eq!(count.get(), 1);

        run(&detach);
        assert!(ctx.keys().is_empty());
    }

    #[test]
    fn test_key_list_forms() {
        let owned = String::from("b");
        let slice: &[&str] = &["c", "d"];
        assert_eq!("a".into_keys(), vec!["a"]);
        assert_eq!((&owned).into_keys(), vec!["b"]);
        assert_eq!(slice.into_keys(), vec!["c", "d"]);
        assert_eq!(KeyboardEventKeyCode::Tab.into_keys(), vec!["Tab"]);
        assert_eq!(
            vec![KeyboardEventKeyCode::F1, KeyboardEventKeyCode::F2].into_keys(),
            vec!["F1", "F2"]
        );
        assert_eq!((&["e", "f"]).into_keys(), vec!["e", "f"]);
    }

    #[test]
    fn test_mouse_subscription() {
        let ctx = InputContext::new();
        let (hooks, attach, detach) = queued_hooks();

        construct(ComponentInstance::new(ctx.clone(), hooks), || {
            on_mouse(MouseEventType::Any, |_| {});
        });
        assert_eq!(ctx.mouse().get(&MouseEventType::Any).map(|s| s.len()), Some(0));

        run(&attach);
        assert_eq!(ctx.mouse().len(&MouseEventType::Any), 1);
        run(&detach);
        assert_eq!(ctx.mouse().len(&MouseEventType::Any), 0);
    }
}
