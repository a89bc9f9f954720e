//! Error types for the sequence engine.
//!
//! Every error is detected locally and surfaced to the caller at the call
//! that triggered it. Nothing is retried and nothing is silently defaulted.
//!
//! Errors raised by a generator adapter are wrapped once in
//! [`SequenceError::Generator`] and then propagate unchanged through every
//! combinator and cache layer. The index whose pull failed is never cached,
//! so a retry reaches the adapter again.

use std::fmt;
use std::sync::Arc;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Error type for sequence operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SequenceError {
    /// A strict operation (`to_vec`, `reduce`, `sum`, ...) was invoked on an
    /// infinite sequence without a bound.
    #[error("cannot {operation} an infinite sequence; bound it with take(n) first")]
    UnboundedMaterialization {
        /// Name of the strict operation that was refused
        operation: &'static str,
    },

    /// `get(i)` requested an index beyond the sequence's length.
    #[error("index {index} is out of range for sequence of length {}", DisplayLength(*.length))]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Known length, `None` if the source ended without declaring one
        length: Option<usize>,
    },

    /// Conflicting or nonsensical cache options.
    #[error("invalid cache configuration: {0}")]
    InvalidCacheConfig(String),

    /// A pull past the end of a finite generator, inside its declared length.
    #[error("generator ended at position {position} but the sequence declares {declared} elements")]
    GeneratorExhausted {
        /// Position of the pull that found no element
        position: usize,
        /// Declared finite length
        declared: usize,
    },

    /// A generator tried to extend the cache of the sequence it is feeding.
    #[error("re-entrant cache extension while materializing index {index}")]
    ReentrantAccess {
        /// Index whose read re-entered the cache
        index: usize,
    },

    /// Error raised by the generator adapter itself.
    #[error("generator failed: {0}")]
    Generator(Arc<dyn std::error::Error + Send + Sync>),

    /// Reading or writing an options file failed.
    #[error("options file I/O failed: {0}")]
    Io(Arc<std::io::Error>),

    /// An options file could not be encoded or decoded.
    #[error("options serialization failed: {0}")]
    Serialization(String),
}

impl SequenceError {
    /// Wrap an adapter error.
    pub fn generator<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Generator(Arc::new(err))
    }

    /// Wrap an adapter failure described only by a message.
    pub fn generator_msg(msg: impl Into<String>) -> Self {
        Self::Generator(Arc::new(AdapterMessage(msg.into())))
    }

    /// Returns true if this error originated in a generator adapter.
    pub fn is_generator_error(&self) -> bool {
        matches!(self, Self::Generator(_))
    }
}

impl From<std::io::Error> for SequenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<toml::de::Error> for SequenceError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for SequenceError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SequenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Plain-text adapter failure.
#[derive(Debug)]
struct AdapterMessage(String);

impl fmt::Display for AdapterMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for AdapterMessage {}

struct DisplayLength(Option<usize>);

impl fmt::Display for DisplayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("unknown"),
        }
    }
}
