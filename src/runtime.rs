//! Input runtime - normalizer and context wired together.
//!
//! The host owns the transport. It hands raw bytes to [`InputRuntime::feed`]
//! and calls [`InputRuntime::tick`] whenever [`InputRuntime::next_deadline`]
//! passes without new input, so a held Escape or a stalled sequence is
//! eventually delivered.
//!
//! ```ignore
//! let mut runtime = InputRuntime::new(InputConfig::default())?;
//! loop {
//!     let timeout = runtime.next_deadline().map(|d| d.saturating_duration_since(Instant::now()));
//!     match read_with_timeout(&mut stdin, timeout)? {
//!         Some(bytes) => { runtime.feed(&bytes, Instant::now()); }
//!         None => { runtime.tick(Instant::now()); }
//!     }
//! }
//! ```

use std::time::Instant;

use crate::config::InputConfig;
use crate::context::InputContext;
use crate::error::Result;
use crate::normalizer::EventNormalizer;
use crate::types::InputEvent;

pub struct InputRuntime {
    normalizer: EventNormalizer,
    context: InputContext,
}

impl InputRuntime {
    /// Runtime with a fresh [`InputContext`].
    pub fn new(config: InputConfig) -> Result<Self> {
        Self::with_context(config, InputContext::new())
    }

    /// Runtime dispatching into an existing context.
    pub fn with_context(config: InputConfig, context: InputContext) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: EventNormalizer::new(config),
            context,
        })
    }

    pub fn context(&self) -> &InputContext {
        &self.context
    }

    pub fn config(&self) -> &InputConfig {
        self.normalizer.config()
    }

    /// Normalize and dispatch a chunk of raw input. Returns the number of
    /// handler invocations.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) -> usize {
        let events = self.normalizer.feed(bytes, now);
        self.dispatch_all(&events)
    }

    /// Dispatch an event decoded elsewhere, such as by the crossterm bridge.
    pub fn feed_event(&mut self, event: InputEvent, now: Instant) -> usize {
        let events = self.normalizer.push(event, now);
        self.dispatch_all(&events)
    }

    /// Deliver whatever has timed out by `now`.
    pub fn tick(&mut self, now: Instant) -> usize {
        let events = self.normalizer.flush(now);
        self.dispatch_all(&events)
    }

    /// Deliver everything still held, at end of input.
    pub fn finish(&mut self) -> usize {
        let events = self.normalizer.finish();
        self.dispatch_all(&events)
    }

    /// When [`tick`](Self::tick) next has something to deliver.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.normalizer.pending_deadline()
    }

    fn dispatch_all(&self, events: &[InputEvent]) -> usize {
        events
            .iter()
            .map(|event| {
                tracing::trace!(?event, "input event");
                self.context.dispatch(event)
            })
            .sum()
    }
}

impl Default for InputRuntime {
    fn default() -> Self {
        Self {
            normalizer: EventNormalizer::default(),
            context: InputContext::new(),
        }
    }
}
