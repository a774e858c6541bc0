//! # spark-tui-input
//!
//! Input-event routing core for terminal UIs.
//!
//! Raw terminal bytes are normalized into typed keypress and mouse events,
//! then dispatched to handlers that components subscribe while they are being
//! built. Subscriptions follow the component lifecycle: attached when it
//! mounts, detached when it unmounts.
//!
//! ```text
//! bytes → EventNormalizer → InputEvent → InputContext::dispatch → handlers
//!                                            ↑
//!                        on_key / on_keypress / on_mouse (inside construct)
//! ```
//!
//! Reactive state (the last keypress and mouse event of each context) is
//! exposed through [spark-signals](https://github.com/RLabs-Inc/spark-signals).
//!
//! ## Modules
//!
//! - [`types`] - Keypress and mouse events, modifiers, key codes
//! - [`normalizer`] - Escape sequence decoding and Escape-double detection
//! - [`registry`] - Handler sets keyed by event identifier
//! - [`dispatch`] - Snapshot-and-invoke delivery
//! - [`subscription`] - `on_key`, `on_keypress`, `on_mouse`, construction scope
//! - [`component`] - Minimal lifecycle host
//! - [`runtime`] - Normalizer and context wired together

pub mod component;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod normalizer;
pub mod registry;
pub mod runtime;
pub mod subscription;
pub mod types;

pub use types::*;

pub use config::InputConfig;
pub use context::InputContext;
pub use error::{InputError, Result};

pub use normalizer::{EventNormalizer, InputParser, Modifier};
pub use normalizer::crossterm_events::{convert_event, convert_key_event, convert_mouse_event};

pub use registry::{
    EventRegistry, Handler, HandlerId, KeyEventRegistry, KeyHandler, MouseEventRegistry,
    MouseHandler, RegistryKey,
};

pub use dispatch::{dispatch_keypress, dispatch_mouse};

pub use subscription::{
    construct, current_instance, is_constructing, on_key, on_keypress, on_mouse,
    subscribe_key_handler, ComponentInstance, IntoKey, IntoKeys, LifecycleHooks, RemoveListener,
};

pub use component::Component;
pub use runtime::InputRuntime;
