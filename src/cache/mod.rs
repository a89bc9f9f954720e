//! Access and materialization layer.
//!
//! Indexed reads (`Sequence::get`) go through a [`Materializer`], which owns
//! the cached elements of one sequence and the policy that decides how the
//! cache grows.
//!
//! # Fast path / slow path
//!
//! Every policy stores its materialized elements in the same [`View`]: a
//! ring buffer plus the absolute index of its first element. The fast path
//! is a shared-borrow flag check, one bounds check against that view and
//! one buffer read. It never looks at the policy, never allocates, and
//! never touches the statistics.
//!
//! On a miss the slow path dispatches on [`CachePolicy`]:
//!
//! | policy | miss cost | memory |
//! |--------|-----------|--------|
//! | `None` | O(i), regenerate from index 0 | O(1) |
//! | `Memo` | O(i - len), resumes from the retained cursor | O(max index) |
//! | `SlidingWindow` ahead | O(i - window_end) | O(W) |
//! | `SlidingWindow` behind | O(i), regenerate from index 0 | O(W) |
//!
//! Sliding windows are tuned for forward sequential access. Reading behind
//! the window is supported but always pays a full regeneration, which is
//! logged at debug level and counted in [`CacheStats::regenerations`].

mod memo;
mod window;

use crate::error::{Result, SequenceError};
use crate::generator::{Cursor, Source};
use crate::sequence::Length;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ops::Range;

/// Batch size used by `memo: true`.
pub const DEFAULT_MEMO_BATCH: usize = 64;

/// Largest number of elements a warm memo miss prefetches past the
/// current end. Larger batch sizes are accepted and clamped to this.
pub const MAX_MEMO_BATCH: usize = 1 << 16;

/// Materialization strategy, fixed for the lifetime of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Nothing is retained; every `get(i)` regenerates from the start.
    #[default]
    None,

    /// Grow-only prefix cache.
    Memo {
        /// Minimum number of elements materialized per warm extension,
        /// clamped to [`MAX_MEMO_BATCH`]
        batch: usize,
    },

    /// Bounded cache holding the most recent `size` elements.
    SlidingWindow {
        /// Window capacity
        size: usize,
    },
}

impl CachePolicy {
    /// Grow-only cache with the default batch size.
    pub fn memo() -> Self {
        Self::Memo {
            batch: DEFAULT_MEMO_BATCH,
        }
    }

    /// Sliding-window cache of `size` elements.
    pub fn window(size: usize) -> Self {
        Self::SlidingWindow { size }
    }

    /// Reject nonsensical parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::None => Ok(()),
            Self::Memo { batch: 0 } => Err(SequenceError::InvalidCacheConfig(
                "memo batch size must be > 0".to_string(),
            )),
            Self::SlidingWindow { size: 0 } => Err(SequenceError::InvalidCacheConfig(
                "sliding window size must be > 0".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Short policy name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Memo { .. } => "memo",
            Self::SlidingWindow { .. } => "sliding-window",
        }
    }
}

/// Slow-path counters.
///
/// Only misses update these. Fast-path hits are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Elements pulled from the generator by the cache
    pub generated: u64,
    /// Slow-path invocations
    pub misses: u64,
    /// Full regenerations from index 0
    pub regenerations: u64,
    /// Elements dropped from a sliding window
    pub evictions: u64,
}

/// Materialized elements addressed by absolute index.
///
/// Backed by a `VecDeque` so the sliding window can evict from the front in
/// O(1). A lookup is one bounds check on the offset from `base` plus the
/// ring buffer's head wrap, which is a branch on the already-loaded head and
/// capacity.
///
/// Reads go through `RefCell::try_borrow` rather than an unchecked access:
/// a generator may call `get` on the very sequence it is feeding, while the
/// slow path holds the state mutably. The flag check turns that case into a
/// miss, and the slow path reports it as `ReentrantAccess`.
#[derive(Debug)]
pub(crate) struct View<T> {
    /// Absolute index of `items[0]`
    base: usize,
    items: VecDeque<T>,
}

impl<T> View<T> {
    fn new() -> Self {
        Self {
            base: 0,
            items: VecDeque::new(),
        }
    }

    #[inline(always)]
    fn lookup(&self, index: usize) -> Option<&T> {
        // Indices below `base` wrap to huge offsets and miss.
        self.items.get(index.wrapping_sub(self.base))
    }

    /// One past the absolute index of the last element.
    #[inline]
    fn end(&self) -> usize {
        self.base + self.items.len()
    }

    fn reset(&mut self) {
        self.items.clear();
        self.base = 0;
    }
}

/// Mutable state behind the materializer.
pub(crate) struct CacheState<T> {
    view: View<T>,
    /// Cursor positioned at `view.end()`, kept so extensions resume
    cursor: Option<Cursor<T>>,
    /// Total element count, once the generator has reported its end
    exhausted_at: Option<usize>,
    stats: CacheStats,
}

impl<T> CacheState<T> {
    fn new() -> Self {
        Self {
            view: View::new(),
            cursor: None,
            exhausted_at: None,
            stats: CacheStats::default(),
        }
    }
}

/// Cache state plus policy for one sequence.
///
/// Shared (via `Rc`) between every clone of a sequence, so all handles see
/// the same materialized elements.
pub(crate) struct Materializer<T> {
    source: Source<T>,
    length: Length,
    policy: CachePolicy,
    state: RefCell<CacheState<T>>,
}

impl<T: Clone + 'static> Materializer<T> {
    pub(crate) fn new(source: Source<T>, length: Length, policy: CachePolicy) -> Self {
        Self {
            source,
            length,
            policy,
            state: RefCell::new(CacheState::new()),
        }
    }

    pub(crate) fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Indexed read.
    #[inline]
    pub(crate) fn get(&self, index: usize) -> Result<T> {
        if let Ok(state) = self.state.try_borrow() {
            if let Some(value) = state.view.lookup(index) {
                return Ok(value.clone());
            }
        }
        self.get_slow(index, true)
    }

    /// Read for in-order iteration.
    ///
    /// Same as [`get`](Self::get), except that a memo miss extends the
    /// buffer only up to `index`, so a cursor never pulls ahead of the
    /// element it yields.
    #[inline]
    pub(crate) fn get_in_order(&self, index: usize) -> Result<T> {
        if let Ok(state) = self.state.try_borrow() {
            if let Some(value) = state.view.lookup(index) {
                return Ok(value.clone());
            }
        }
        self.get_slow(index, false)
    }

    #[cold]
    fn get_slow(&self, index: usize, prefetch: bool) -> Result<T> {
        if let Some(bound) = self.length.upper_bound() {
            if index >= bound {
                return Err(SequenceError::IndexOutOfRange {
                    index,
                    length: self.length.exact(),
                });
            }
        }

        // Fails only when a generator reads the sequence it is feeding.
        let mut state = self
            .state
            .try_borrow_mut()
            .map_err(|_| SequenceError::ReentrantAccess { index })?;
        if let Some(end) = state.exhausted_at {
            if index >= end {
                return Err(SequenceError::IndexOutOfRange {
                    index,
                    length: Some(end),
                });
            }
        }
        state.stats.misses += 1;

        match self.policy {
            CachePolicy::None => {
                drop(state);
                self.regenerate_nth(index)
            }
            CachePolicy::Memo { batch } => {
                let batch = if prefetch { batch } else { 1 };
                memo::extend(&mut state, &self.source, self.length, batch, index)?;
                Ok(read(&state.view, index))
            }
            CachePolicy::SlidingWindow { size } => {
                window::shift(&mut state, &self.source, size, index)?;
                Ok(read(&state.view, index))
            }
        }
    }

    /// Uncached read: walk a fresh cursor up to `index`.
    fn regenerate_nth(&self, index: usize) -> Result<T> {
        let mut cursor = self.source.open();
        let result = cursor.pull_nth(index);
        let mut state = self.state.borrow_mut();
        state.stats.generated += cursor.produced() as u64;
        state.stats.regenerations += 1;

        match result? {
            Some(value) => Ok(value),
            None => {
                let end = cursor.produced();
                state.exhausted_at = Some(end);
                Err(SequenceError::IndexOutOfRange {
                    index,
                    length: Some(end),
                })
            }
        }
    }

    /// Slow-path counters so far.
    pub(crate) fn stats(&self) -> CacheStats {
        self.state.borrow().stats
    }

    /// Absolute index range currently held in memory.
    pub(crate) fn materialized(&self) -> Range<usize> {
        let state = self.state.borrow();
        state.view.base..state.view.end()
    }

    /// Drop every materialized element and the retained cursor.
    pub(crate) fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.view.reset();
        state.cursor = None;
        state.exhausted_at = None;
        state.stats = CacheStats::default();
        log::debug!("cleared {} cache", self.policy.name());
    }
}

/// Read an element the slow path has just guaranteed to be present.
fn read<T: Clone>(view: &View<T>, index: usize) -> T {
    match view.lookup(index) {
        Some(value) => value.clone(),
        None => unreachable!("index {index} missing after cache extension"),
    }
}

/// Pull one element for the cache, keeping the view and cursor in step.
///
/// The cursor must be positioned at `state.view.end()`. Returns `Ok(false)`
/// when the generator has ended.
fn pull_into<T>(state: &mut CacheState<T>, cursor: &mut Cursor<T>) -> Result<bool> {
    debug_assert_eq!(cursor.produced(), state.view.end());
    match cursor.pull()? {
        Some(value) => {
            state.view.items.push_back(value);
            state.stats.generated += 1;
            Ok(true)
        }
        None => {
            state.exhausted_at = Some(state.view.end());
            Ok(false)
        }
    }
}
