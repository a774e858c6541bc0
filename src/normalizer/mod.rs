//! Event Normalizer - raw terminal input → typed events.
//!
//! Wraps the byte-level [`InputParser`] with the only time-dependent rule in
//! the input core: two Escape presses inside
//! [`InputConfig::escape_double_timeout`] collapse into one `EscapeDouble`.
//!
//! A lone ESC byte first waits [`InputConfig::sequence_timeout`] in case it
//! starts an escape sequence split across reads. Once it stands as a plain
//! Escape it is held back until one of:
//! - a second Escape arrives inside the window → `EscapeDouble`
//! - any other event arrives → `Escape`, then that event
//! - [`flush`](EventNormalizer::flush) runs after the window → `Escape`
//! - [`finish`](EventNormalizer::finish) ends the input → `Escape`
//!
//! Time is always passed in, so the normalizer never reads a clock itself.
//!
//! # Example
//!
//! ```ignore
//! let mut normalizer = EventNormalizer::new(InputConfig::default());
//! let now = Instant::now();
//!
//! let events = normalizer.feed(b"\x1b[1;5B", now);
//! assert_eq!(events[0].key(), Some("ArrowDown"));
//! ```

mod parser;
mod sequences;
pub mod crossterm_events;

use std::time::{Duration, Instant};

pub use parser::{InputParser, Modifier};

use crate::config::InputConfig;
use crate::types::{InputEvent, KeyboardEventKeyCode, KeypressEventRaw, Modifiers};

/// A lone Escape waiting to see whether a second one follows.
#[derive(Debug, Clone)]
struct PendingEscape {
    at: Instant,
    input: String,
}

/// Stateful normalizer for one input stream.
pub struct EventNormalizer {
    config: InputConfig,
    parser: InputParser,
    pending_escape: Option<PendingEscape>,
    /// When the parser started holding an incomplete sequence.
    partial_since: Option<Instant>,
}

impl EventNormalizer {
    pub fn new(config: InputConfig) -> Self {
        let parser = InputParser::new(config.mouse);
        Self {
            config,
            parser,
            pending_escape: None,
            partial_since: None,
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Normalize one chunk of raw input received at `now`.
    pub fn feed(&mut self, data: &[u8], now: Instant) -> Vec<InputEvent> {
        let mut out = Vec::new();
        self.flush_partial(now, &mut out);
        self.expire_escape(now, &mut out);

        let had_partial = self.parser.has_pending();
        let events = self.parser.parse(data);
        // Any event consumes the buffered bytes first, so a partial left
        // over after one was emitted is a new sequence.
        let partial_replaced = !events.is_empty();
        for event in events {
            self.push_into(event, now, &mut out);
        }

        self.partial_since = match (self.parser.has_pending(), self.partial_since) {
            (true, Some(since)) if had_partial && !partial_replaced => Some(since),
            (true, _) => Some(now),
            (false, _) => None,
        };
        out
    }

    /// Run an already-decoded event (e.g. from crossterm) through the
    /// Escape-double rule.
    pub fn push(&mut self, event: InputEvent, now: Instant) -> Vec<InputEvent> {
        let mut out = Vec::new();
        self.flush_partial(now, &mut out);
        self.expire_escape(now, &mut out);
        self.push_into(event, now, &mut out);
        out
    }

    /// Release whatever timed out by `now`: an incomplete sequence older than
    /// the sequence timeout and a pending Escape past its window.
    pub fn flush(&mut self, now: Instant) -> Vec<InputEvent> {
        let mut out = Vec::new();
        self.flush_partial(now, &mut out);
        self.expire_escape(now, &mut out);
        out
    }

    /// End of input: release everything still held.
    pub fn finish(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        let partial = self.parser.flush_pending();

        match self.partial_since.take() {
            Some(since) => {
                self.expire_escape(since, &mut out);
                for event in partial {
                    self.push_into(event, since, &mut out);
                }
            }
            None => {
                self.release_escape(&mut out);
                out.extend(partial);
            }
        }
        self.release_escape(&mut out);
        out
    }

    /// Earliest instant at which [`flush`](Self::flush) would release something.
    pub fn pending_deadline(&self) -> Option<Instant> {
        let escape = self
            .pending_escape
            .as_ref()
            .map(|p| p.at + self.config.escape_double_timeout() + Duration::from_nanos(1));
        let partial = self.partial_since.map(|since| since + self.config.sequence_timeout());

        match (escape, partial) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// True while an Escape is waiting for a possible second press.
    pub fn has_pending_escape(&self) -> bool {
        self.pending_escape.is_some()
    }

    fn push_into(&mut self, event: InputEvent, now: Instant, out: &mut Vec<InputEvent>) {
        let raw = match event {
            InputEvent::Keypress(raw) if is_plain_escape(&raw) => raw,
            other => {
                self.release_escape(out);
                out.push(other);
                return;
            }
        };

        match self.pending_escape.take() {
            Some(first) => {
                tracing::trace!("escape double press");
                out.push(InputEvent::Keypress(KeypressEventRaw::new(
                    first.input + &raw.input,
                    KeyboardEventKeyCode::EscapeDouble.as_str(),
                    Modifiers::default(),
                )));
            }
            None => {
                self.pending_escape = Some(PendingEscape { at: now, input: raw.input });
            }
        }
    }

    /// Give up on a partial sequence that has waited the sequence timeout.
    /// Its events count as received when the partial started.
    fn flush_partial(&mut self, now: Instant, out: &mut Vec<InputEvent>) {
        let Some(since) = self.partial_since else {
            return;
        };
        if now.saturating_duration_since(since) < self.config.sequence_timeout() {
            return;
        }

        self.partial_since = None;
        self.expire_escape(since, out);
        for event in self.parser.flush_pending() {
            self.push_into(event, since, out);
        }
    }

    fn expire_escape(&mut self, now: Instant, out: &mut Vec<InputEvent>) {
        let window = self.config.escape_double_timeout();
        let expired = self
            .pending_escape
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.at) > window);
        if expired {
            self.release_escape(out);
        }
    }

    fn release_escape(&mut self, out: &mut Vec<InputEvent>) {
        if let Some(pending) = self.pending_escape.take() {
            out.push(InputEvent::Keypress(KeypressEventRaw::new(
                pending.input,
                KeyboardEventKeyCode::Escape.as_str(),
                Modifiers::default(),
            )));
        }
    }
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

fn is_plain_escape(raw: &KeypressEventRaw) -> bool {
    raw.key.as_deref() == Some(KeyboardEventKeyCode::Escape.as_str()) && raw.modifiers.is_empty()
}

// =============================================================================
// TESTS
// =============================================================================
