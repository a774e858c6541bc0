//! Normalizer configuration.
//!
//! ```toml
//! escape_double_timeout_ms = 300
//! sequence_timeout_ms = 10
//! mouse = true
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::{InputError, Result};

/// Timing and decoding options for the event normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Window in which a second Escape turns the pair into `EscapeDouble`.
    pub escape_double_timeout_ms: u64,

    /// How long an incomplete escape sequence may wait for its remaining bytes.
    pub sequence_timeout_ms: u64,

    /// Decode mouse reports. When false they surface as unclassified keypresses.
    pub mouse: bool,
}

impl InputConfig {
    const DEFAULT_ESCAPE_DOUBLE_TIMEOUT_MS: u64 = 300;
    const DEFAULT_SEQUENCE_TIMEOUT_MS: u64 = 10;

    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the normalizer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.escape_double_timeout_ms == 0 {
            return Err(InputError::InvalidConfig {
                field: "escape_double_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Set the Escape-double window. Sub-millisecond windows round up to 1 ms.
    pub fn with_escape_double_timeout(mut self, timeout: Duration) -> Self {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.escape_double_timeout_ms = ms.max(1);
        self
    }

    /// The Escape-double window, never shorter than 1 ms.
    pub fn escape_double_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_double_timeout_ms.max(1))
    }

    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.sequence_timeout_ms)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            escape_double_timeout_ms: Self::DEFAULT_ESCAPE_DOUBLE_TIMEOUT_MS,
            sequence_timeout_ms: Self::DEFAULT_SEQUENCE_TIMEOUT_MS,
            mouse: true,
        }
    }
}
