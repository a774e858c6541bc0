//! Error types for the input core.
//!
//! Normalization, registry and dispatch never fail. Only the edges do:
//! loading configuration and host-side I/O.

use thiserror::Error;

/// Input core error type.
#[derive(Error, Debug)]
pub enum InputError {
    /// An I/O error occurred while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text was not valid TOML for [`InputConfig`](crate::InputConfig).
    #[error("failed to parse input config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid input config: {field}: {reason}")]
    InvalidConfig {
        /// The offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type alias using [`InputError`].
pub type Result<T> = std::result::Result<T, InputError>;
