//! Fluent builder for sequences.
//!
//! [`SequenceBuilder`] collects the same settings as
//! [`SequenceOptions`](crate::SequenceOptions), validates them once, and
//! wraps a generator factory into a [`Sequence`].
//!
//! # Quick Start
//!
//! ```ignore
//! use sequence_engine::SequenceBuilder;
//!
//! let primes = SequenceBuilder::new()
//!     .memo()
//!     .build_from_fn(prime_generator)?;
//!
//! let p = primes.get(999)?;
//! ```
//!
//! # Policy Reference
//!
//! | Method | Policy | Best for |
//! |--------|--------|----------|
//! | (none) | no cache | cheap generators, single pass |
//! | `memo()` | grow-only, batch 64 | repeated random access |
//! | `memo_batch(n)` | grow-only, batch `n` | tuned prefetch |
//! | `sliding_window(w)` | last `w` elements | forward scans with short look-back |
//!
//! The last cache method called wins; `memo` and `sliding_window` never
//! combine.

use crate::cache::CachePolicy;
use crate::config::SequenceOptions;
use crate::error::Result;
use crate::generator::{Generator, Source};
use crate::sequence::{Length, Sequence};

/// Fluent builder for [`Sequence`].
///
/// # Example
///
/// ```
/// use sequence_engine::SequenceBuilder;
///
/// let evens = SequenceBuilder::new()
///     .finite(5)
///     .sliding_window(2)
///     .build_from_fn(|| {
///         let mut n = 0u32;
///         move || -> sequence_engine::Result<Option<u32>> {
///             n += 2;
///             Ok(Some(n))
///         }
///     })
///     .unwrap();
///
/// assert_eq!(evens.to_vec().unwrap(), vec![2, 4, 6, 8, 10]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    finite: Option<usize>,
    policy: CachePolicy,
}

impl SequenceBuilder {
    /// Infinite, uncached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from deserialized options, validating them.
    pub fn from_options(options: &SequenceOptions) -> Result<Self> {
        Ok(Self {
            finite: options.finite,
            policy: options.cache_policy()?,
        })
    }

    // =========================================================================
    // Length
    // =========================================================================

    /// Declare an exact finite length.
    pub fn finite(mut self, n: usize) -> Self {
        self.finite = Some(n);
        self
    }

    /// Drop a previous length declaration.
    pub fn infinite(mut self) -> Self {
        self.finite = None;
        self
    }

    // =========================================================================
    // Cache Policy
    // =========================================================================

    /// Grow-only cache with the default batch size.
    pub fn memo(mut self) -> Self {
        self.policy = CachePolicy::memo();
        self
    }

    /// Grow-only cache materializing at least `batch` elements per miss.
    pub fn memo_batch(mut self, batch: usize) -> Self {
        self.policy = CachePolicy::Memo { batch };
        self
    }

    /// Keep only the most recent `size` elements.
    pub fn sliding_window(mut self, size: usize) -> Self {
        self.policy = CachePolicy::window(size);
        self
    }

    /// No cache.
    pub fn uncached(mut self) -> Self {
        self.policy = CachePolicy::None;
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Length marker the built sequence will carry.
    pub fn length(&self) -> Length {
        match self.finite {
            Some(n) => Length::Finite(n),
            None => Length::Infinite,
        }
    }

    /// The equivalent serializable options.
    pub fn options(&self) -> SequenceOptions {
        let mut options = SequenceOptions::new();
        if let Some(n) = self.finite {
            options = options.with_finite(n);
        }
        match self.policy {
            CachePolicy::None => options,
            CachePolicy::Memo { batch } => options.with_memo_batch(batch),
            CachePolicy::SlidingWindow { size } => options.with_cache(size),
        }
    }

    /// Wrap `source` into a sequence.
    ///
    /// # Errors
    ///
    /// `InvalidCacheConfig` when a batch or window size is zero.
    pub fn build<T: Clone + 'static>(&self, source: Source<T>) -> Result<Sequence<T>> {
        self.policy.validate()?;
        let sequence = match self.finite {
            Some(n) => Sequence::finite(source, n),
            None => Sequence::new(source),
        };
        log::debug!(
            "built sequence: length={}, policy={}",
            sequence.length(),
            self.policy.name()
        );
        sequence.with_cache(self.policy)
    }

    /// Wrap a generator factory into a sequence.
    pub fn build_from_fn<T, F, G>(&self, factory: F) -> Result<Sequence<T>>
    where
        T: Clone + 'static,
        F: Fn() -> G + 'static,
        G: Generator<T> + 'static,
    {
        self.build(Source::new(factory))
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        let cache = match self.policy {
            CachePolicy::None => "none".to_string(),
            CachePolicy::Memo { batch } => format!("memo (batch {batch})"),
            CachePolicy::SlidingWindow { size } => format!("sliding window ({size})"),
        };
        format!("SequenceBuilder: length {}, cache {}", self.length(), cache)
    }
}
