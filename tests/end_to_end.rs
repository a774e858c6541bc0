use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use spark_tui_input::{
    on_key, on_keypress, on_mouse, Component, InputConfig, InputContext, InputEvent,
    InputRuntime, KeyboardEventKeyCode, KeypressEvent, Modifiers, MouseEventButton,
    MouseEventType,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn arrow_keys_reach_typed_handler_and_letters_do_not() {
    let mut runtime = InputRuntime::default();
    let seen: Rc<RefCell<Vec<KeypressEvent>>> = Rc::default();

    let component = Component::new(runtime.context());
    let s = seen.clone();
    component.setup(|| {
        on_key(["ArrowUp", "ArrowDown"], move |event| s.borrow_mut().push(event.clone()));
    });
    component.mount();

    let now = Instant::now();
    runtime.feed(b"\x1b[A", now);
    runtime.feed(b"\x1b[1;5B", now);
    runtime.feed(b"a", now);

    assert_eq!(
        *seen.borrow(),
        vec![
            KeypressEvent::new("ArrowUp"),
            KeypressEvent::with_modifiers("ArrowDown", Modifiers::ctrl()),
        ]
    );
}

#[test]
fn wildcard_and_specific_subscriptions_run_once_each() {
    let mut runtime = InputRuntime::default();
    let specific = Rc::new(Cell::new(0));
    let any = Rc::new(Cell::new(0));

    let component = Component::new(runtime.context());
    let (sp, an) = (specific.clone(), any.clone());
    component.setup(|| {
        on_key(KeyboardEventKeyCode::Enter, move |_| sp.set(sp.get() + 1));
        on_keypress(move |_| an.set(an.get() + 1));
    });
    component.mount();

    let invoked = runtime.feed(b"\r", Instant::now());
    assert_eq!(invoked, 2);
    assert_eq!((specific.get(), any.get()), (1, 1));
}

#[test]
fn remover_stops_delivery_and_is_harmless_twice() {
    let mut runtime = InputRuntime::default();
    let count = Rc::new(Cell::new(0));

    let component = Component::new(runtime.context());
    let c = count.clone();
    let remover = component.setup(|| on_key("x", move |_| c.set(c.get() + 1)));
    component.mount();

    let now = Instant::now();
    runtime.feed(b"x", now);
    remover.remove();
    remover.remove();
    runtime.feed(b"x", now);

    assert_eq!(count.get(), 1);
}

#[test]
fn unmount_removes_component_handlers() {
    let mut runtime = InputRuntime::default();
    let count = Rc::new(Cell::new(0));

    let component = Component::new(runtime.context());
    let c = count.clone();
    component.setup(|| {
        on_keypress(move |_| c.set(c.get() + 1));
    });
    component.mount();

    let now = Instant::now();
    runtime.feed(b"ab", now);
    component.unmount();
    runtime.feed(b"cd", now);

    assert_eq!(count.get(), 2);
    assert!(runtime.context().keys().is_empty());
}

#[test]
fn double_escape_is_one_event() {
    let mut runtime = InputRuntime::default();
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();

    let component = Component::new(runtime.context());
    let s = seen.clone();
    component.setup(|| {
        on_key(
            [KeyboardEventKeyCode::Escape, KeyboardEventKeyCode::EscapeDouble],
            move |event| s.borrow_mut().push(event.key.clone()),
        );
    });
    component.mount();

    let t0 = Instant::now();
    runtime.feed(b"\x1b", t0);
    runtime.feed(b"\x1b", t0 + ms(120));
    runtime.tick(t0 + ms(1000));
    assert_eq!(*seen.borrow(), vec!["EscapeDouble".to_string()]);

    seen.borrow_mut().clear();
    let t1 = t0 + ms(2000);
    runtime.feed(b"\x1b", t1);
    assert!(seen.borrow().is_empty());
    runtime.tick(t1 + ms(301));
    assert_eq!(*seen.borrow(), vec!["Escape".to_string()]);
}

#[test]
fn mouse_type_codes_survive_normalization() {
    let mut runtime = InputRuntime::default();
    let kinds: Rc<RefCell<Vec<i32>>> = Rc::default();

    let component = Component::new(runtime.context());
    let k = kinds.clone();
    component.setup(|| {
        on_mouse(MouseEventType::Any, move |event| k.borrow_mut().push(event.kind.code()));
    });
    component.mount();

    // SGR: press, drag, release at column 10, row 5
    runtime.feed(b"\x1b[<0;10;5M\x1b[<32;11;5M\x1b[<0;11;5m", Instant::now());

    assert_eq!(*kinds.borrow(), vec![0, 1, 2]);
    let last = runtime.context().last_mouse().unwrap();
    assert_eq!(last.button, MouseEventButton::Main);
    assert_eq!((last.client_x, last.client_y), (10, 4));
}

#[test]
fn runtimes_do_not_share_subscriptions() {
    let mut first = InputRuntime::default();
    let mut second = InputRuntime::default();
    let count = Rc::new(Cell::new(0));

    let component = Component::new(first.context());
    let c = count.clone();
    component.setup(|| {
        on_keypress(move |_| c.set(c.get() + 1));
    });
    component.mount();

    let now = Instant::now();
    assert_eq!(second.feed(b"zz", now), 0);
    assert_eq!(first.feed(b"z", now), 1);
    assert_eq!(count.get(), 1);
}

#[test]
fn shared_context_across_runtimes() {
    let ctx = InputContext::new();
    let mut runtime = InputRuntime::with_context(InputConfig::default(), ctx.clone()).unwrap();
    let count = Rc::new(Cell::new(0));

    let component = Component::new(&ctx);
    let c = count.clone();
    component.setup(|| {
        on_key("k", move |_| c.set(c.get() + 1));
    });
    component.mount();

    runtime.feed(b"k", Instant::now());
    assert_eq!(count.get(), 1);
    assert_eq!(ctx.last_key().as_deref(), Some("k"));
}

#[test]
fn unclassified_input_reaches_raw_listener_only() {
    let mut runtime = InputRuntime::default();
    let raw_inputs: Rc<RefCell<Vec<String>>> = Rc::default();
    let typed = Rc::new(Cell::new(0));

    let component = Component::new(runtime.context());
    let (r, t) = (raw_inputs.clone(), typed.clone());
    component.setup(|| {
        on_keypress(move |raw| {
            if raw.key.is_none() {
                r.borrow_mut().push(raw.input.clone());
            }
        });
        on_key(spark_tui_input::WILDCARD_KEY, move |_| t.set(t.get() + 1));
    });
    component.mount();

    runtime.feed(b"\x1b[99z", Instant::now());
    assert_eq!(*raw_inputs.borrow(), vec!["\x1b[99z".to_string()]);
    assert_eq!(typed.get(), 0);
}

#[test]
fn crossterm_events_share_the_dispatch_path() {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    let mut runtime = InputRuntime::default();
    let seen: Rc<RefCell<Vec<KeypressEvent>>> = Rc::default();

    let component = Component::new(runtime.context());
    let s = seen.clone();
    component.setup(|| {
        on_key("ArrowLeft", move |event| s.borrow_mut().push(event.clone()));
    });
    component.mount();

    let event = Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT));
    let converted = spark_tui_input::convert_event(event).unwrap();
    assert!(matches!(converted, InputEvent::Keypress(_)));
    runtime.feed_event(converted, Instant::now());

    assert_eq!(
        *seen.borrow(),
        vec![KeypressEvent::with_modifiers("ArrowLeft", Modifiers::alt())]
    );
}

#[test]
fn arrow_split_across_reads_is_still_an_arrow() {
    let mut runtime = InputRuntime::default();
    let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::default();

    let component = Component::new(runtime.context());
    let s = seen.clone();
    component.setup(|| {
        on_keypress(move |raw| s.borrow_mut().push(raw.key.clone()));
    });
    component.mount();

    let t0 = Instant::now();
    assert_eq!(runtime.feed(b"\x1b", t0), 0);
    assert_eq!(runtime.feed(b"[A", t0 + ms(1)), 1);
    assert_eq!(runtime.finish(), 0);

    assert_eq!(*seen.borrow(), vec![Some("ArrowUp".to_string())]);
}
