//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```
//! use sequence_engine::prelude::*;
//!
//! let evens = sources::naturals().filter(|x| x % 2 == 0);
//! assert_eq!(evens.take(3).to_vec().unwrap(), vec![2, 4, 6]);
//! ```
//!
//! # What's Included
//!
//! ## Core
//! - [`Sequence`] - Lazy, restartable sequence
//! - [`Length`] - Finite / bounded / infinite length marker
//! - [`make_sequence`] - Build a sequence from a factory and options
//! - [`sources`] - Stock generators
//!
//! ## Generators
//! - [`Generator`] - Pull-based producer trait
//! - [`Source`] - Restartable generator factory
//! - [`Cursor`] - Positioned handle over one generator
//!
//! ## Caching
//! - [`CachePolicy`] - None, memo or sliding window
//! - [`CacheStats`] - Slow-path counters
//!
//! ## Configuration
//! - [`SequenceOptions`] - Serializable options
//! - [`SequenceBuilder`] - Fluent construction
//!
//! ## Errors
//! - [`SequenceError`], [`Result`]

// ============================================================================
// Core
// ============================================================================

pub use crate::sequence::{make_sequence, Length, Sequence};
pub use crate::sources;

// ============================================================================
// Generators
// ============================================================================

pub use crate::generator::{Cursor, Generator, Source};

// ============================================================================
// Caching
// ============================================================================

pub use crate::cache::{CachePolicy, CacheStats, DEFAULT_MEMO_BATCH, MAX_MEMO_BATCH};
pub use crate::sync::SharedMemo;

// ============================================================================
// Configuration
// ============================================================================

pub use crate::builder::SequenceBuilder;
pub use crate::config::{MemoOption, SequenceOptions};

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::error::{Result, SequenceError};
