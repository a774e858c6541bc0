//! Minimal component host.
//!
//! Supplies [`LifecycleHooks`] for code that has no UI framework of its own:
//! attach callbacks run on [`Component::mount`], detach callbacks on
//! [`Component::unmount`] (or drop). Subscriptions made after mounting attach
//! right away.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::context::InputContext;
use crate::subscription::{construct, ComponentInstance, LifecycleHooks};

type Callbacks = RefCell<Vec<Box<dyn FnOnce()>>>;

#[derive(Default)]
struct Lifecycle {
    mounted: Cell<bool>,
    attach: Callbacks,
    detach: Callbacks,
}

impl Lifecycle {
    fn run(callbacks: &Callbacks) {
        let pending = std::mem::take(&mut *callbacks.borrow_mut());
        for callback in pending {
            callback();
        }
    }
}

/// A component that owns the lifecycle of the subscriptions made in its
/// [`setup`](Component::setup).
pub struct Component {
    context: InputContext,
    lifecycle: Rc<Lifecycle>,
}

impl Component {
    pub fn new(context: &InputContext) -> Self {
        Self {
            context: context.clone(),
            lifecycle: Rc::default(),
        }
    }

    pub fn context(&self) -> &InputContext {
        &self.context
    }

    /// Run `build` as this component's construction.
    pub fn setup<R>(&self, build: impl FnOnce() -> R) -> R {
        construct(self.instance(), build)
    }

    /// Attach every subscription made so far.
    pub fn mount(&self) {
        if self.lifecycle.mounted.replace(true) {
            return;
        }
        Lifecycle::run(&self.lifecycle.attach);
    }

    /// Detach every subscription. Mounting again does not restore them.
    pub fn unmount(&self) {
        if !self.lifecycle.mounted.replace(false) {
            return;
        }
        self.lifecycle.attach.borrow_mut().clear();
        Lifecycle::run(&self.lifecycle.detach);
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.mounted.get()
    }

    fn instance(&self) -> ComponentInstance {
        let (attach_to, detach_to) = (Rc::clone(&self.lifecycle), Rc::clone(&self.lifecycle));
        let hooks = LifecycleHooks::new(
            move |callback| {
                if attach_to.mounted.get() {
                    callback();
                } else {
                    attach_to.attach.borrow_mut().push(callback);
                }
            },
            move |callback| detach_to.detach.borrow_mut().push(callback),
        );
        ComponentInstance::new(self.context.clone(), hooks)
    }
}

impl Drop for Component {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::on_key;
    use crate::types::{KeypressEventRaw, Modifiers};

    fn press(key: &str) -> KeypressEventRaw {
        KeypressEventRaw::new(key, key, Modifiers::none())
    }

    #[test]
    fn test_mount_attaches_unmount_detaches() {
        let ctx = InputContext::new();
        let component = Component::new(&ctx);
        component.setup(|| {
            on_key("Enter", |_| {});
        });

        assert_eq!(ctx.dispatch_keypress(&press("Enter")), 0);
        component.mount();
        assert_eq!(ctx.dispatch_keypress(&press("Enter")), 1);
        component.unmount();
        assert_eq!(ctx.dispatch_keypress(&press("Enter")), 0);
        assert!(!component.is_mounted());
    }

    #[test]
    fn test_setup_after_mount_attaches_immediately() {
        let ctx = InputContext::new();
        let component = Component::new(&ctx);
        component.mount();
        component.setup(|| {
            on_key("x", |_| {});
        });
        assert_eq!(ctx.keys().len("x"), 1);
    }

    #[test]
    fn test_drop_detaches() {
        let ctx = InputContext::new();
        {
            let component = Component::new(&ctx);
            component.setup(|| {
                on_key("x", |_| {});
            });
            component.mount();
            assert_eq!(ctx.keys().len("x"), 1);
        }
        assert_eq!(ctx.keys().len("x"), 0);
    }

    #[test]
    fn test_unmount_before_mount_is_noop() {
        let ctx = InputContext::new();
        let component = Component::new(&ctx);
        component.setup(|| {
            on_key("x", |_| {});
        });
        component.unmount();
        component.mount();
        assert_eq!(ctx.keys().len("x"), 1);
    }
}
