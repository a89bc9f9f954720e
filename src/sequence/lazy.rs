//! Sequence core: construction, cursors, truncation and materialization.

use crate::cache::{CachePolicy, CacheStats, Materializer};
use crate::config::SequenceOptions;
use crate::error::{Result, SequenceError};
use crate::generator::{Cursor, Generator, Source};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

/// Length marker of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Length {
    /// Exactly `n` elements.
    Finite(usize),

    /// Finite, with at most `n` elements. Produced by combinators such as
    /// `filter` whose output length is only known after generation.
    AtMost(usize),

    /// Unbounded. Strict operations refuse to run until bounded with `take`.
    Infinite,
}

impl Length {
    /// True for `Infinite`.
    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Upper bound on the element count, `None` if infinite.
    #[inline]
    pub fn upper_bound(&self) -> Option<usize> {
        match *self {
            Self::Finite(n) | Self::AtMost(n) => Some(n),
            Self::Infinite => None,
        }
    }

    /// Exact element count, when known.
    #[inline]
    pub fn exact(&self) -> Option<usize> {
        match *self {
            Self::Finite(n) => Some(n),
            _ => None,
        }
    }

    /// Length after keeping at most `n` elements.
    pub fn truncate(self, n: usize) -> Self {
        match self {
            Self::Finite(m) => Self::Finite(m.min(n)),
            Self::AtMost(m) => Self::AtMost(m.min(n)),
            Self::Infinite => Self::Finite(n),
        }
    }

    /// Length after dropping the first `n` elements.
    pub fn skip(self, n: usize) -> Self {
        match self {
            Self::Finite(m) => Self::Finite(m.saturating_sub(n)),
            Self::AtMost(m) => Self::AtMost(m.saturating_sub(n)),
            Self::Infinite => Self::Infinite,
        }
    }

    /// Length after an element filter: the bound survives, exactness does not.
    pub fn filtered(self) -> Self {
        match self {
            Self::Finite(m) | Self::AtMost(m) => Self::AtMost(m),
            Self::Infinite => Self::Infinite,
        }
    }

    /// Length of a pairwise combination; `Infinite` acts as infinity.
    pub fn min(self, other: Self) -> Self {
        match (self, other) {
            (Self::Infinite, x) | (x, Self::Infinite) => x,
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a.min(b)),
            (a, b) => {
                let bound = a.upper_bound().unwrap_or(usize::MAX);
                Self::AtMost(bound.min(b.upper_bound().unwrap_or(usize::MAX)))
            }
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(n) => write!(f, "{n}"),
            Self::AtMost(n) => write!(f, "<={n}"),
            Self::Infinite => f.write_str("infinite"),
        }
    }
}

/// A lazy, restartable, optionally cached sequence.
///
/// Cloning is O(1). Clones share the source and the materialized cache, but
/// each clone has its own iteration cursor, so sharing a sequence between
/// consumers is safe for both `get` and `next`.
///
/// # Example
///
/// ```
/// use sequence_engine::sources;
///
/// let squares = sources::naturals().map(|x| x * x);
/// assert_eq!(squares.take(10).sum().unwrap(), 385);
/// ```
pub struct Sequence<T> {
    source: Source<T>,
    length: Length,
    cache: Rc<Materializer<T>>,
    cursor: Option<Cursor<T>>,
}

impl<T: Clone + 'static> Sequence<T> {
    /// Wrap a source as an infinite, uncached sequence.
    pub fn new(source: Source<T>) -> Self {
        Self::from_parts(source, Length::Infinite, CachePolicy::None)
    }

    /// Wrap a source with a declared exact length.
    ///
    /// Cursors stop after `n` elements; a generator that ends earlier makes
    /// the pull fail with [`SequenceError::GeneratorExhausted`].
    pub fn finite(source: Source<T>, n: usize) -> Self {
        Self::from_parts(source.declared(n), Length::Finite(n), CachePolicy::None)
    }

    /// Wrap a source according to `options`.
    pub fn with_options(source: Source<T>, options: &SequenceOptions) -> Result<Self> {
        let policy = options.cache_policy()?;
        let sequence = match options.finite {
            Some(n) => Self::finite(source, n),
            None => Self::new(source),
        };
        Ok(sequence.rebuild_cache(policy))
    }

    /// Wrap a source whose length is already enforced by the source itself.
    pub(crate) fn from_parts(source: Source<T>, length: Length, policy: CachePolicy) -> Self {
        let cache = Rc::new(Materializer::new(source.clone(), length, policy));
        Self {
            source,
            length,
            cache,
            cursor: None,
        }
    }

    /// Same elements, new cache policy, fresh (empty) cache.
    pub fn with_cache(&self, policy: CachePolicy) -> Result<Self> {
        policy.validate()?;
        Ok(self.rebuild_cache(policy))
    }

    /// Same elements with a grow-only cache of the default batch size.
    pub fn memoize(&self) -> Self {
        self.rebuild_cache(CachePolicy::memo())
    }

    fn rebuild_cache(&self, policy: CachePolicy) -> Self {
        Self::from_parts(self.source.clone(), self.length, policy)
    }

    /// Length marker.
    #[inline]
    pub fn length(&self) -> Length {
        self.length
    }

    /// Exact length, when known.
    #[inline]
    pub fn len(&self) -> Option<usize> {
        self.length.exact()
    }

    /// True if the sequence is declared with zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length.upper_bound() == Some(0)
    }

    /// True for infinite sequences.
    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.length.is_infinite()
    }

    /// Configured cache policy.
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache.policy()
    }

    /// Slow-path cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Absolute index range currently materialized.
    pub fn materialized(&self) -> Range<usize> {
        self.cache.materialized()
    }

    /// Drop every materialized element. Shared by all clones.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Advance this handle's cursor.
    pub fn next(&mut self) -> Result<Option<T>> {
        if self.cursor.is_none() {
            self.cursor = Some(self.restart());
        }
        match self.cursor.as_mut() {
            Some(cursor) => cursor.pull(),
            None => Ok(None),
        }
    }

    /// Reset this handle's cursor to the first element.
    pub fn rewind(&mut self) {
        self.cursor = None;
    }

    /// A fresh cursor, independent of every other cursor over this sequence.
    ///
    /// Under the memo policy the cursor reads through the shared cache, so
    /// repeated iteration does not invoke the generator again. It extends
    /// the cache one element at a time, without the batch prefetch of `get`,
    /// so consuming `k` elements pulls at most `k` from the generator.
    pub fn restart(&self) -> Cursor<T> {
        match self.cache.policy() {
            CachePolicy::Memo { .. } => Cursor::new(CachedReader {
                cache: Rc::clone(&self.cache),
                position: 0,
            }),
            _ => self.source.open(),
        }
    }

    /// Indexed read.
    ///
    /// Hits in the materialized range cost a borrow-flag check, a bounds check
    /// and a buffer read.
    /// Misses extend the cache according to the configured policy.
    #[inline]
    pub fn get(&self, index: usize) -> Result<T> {
        self.cache.get(index)
    }

    /// At most the first `n` elements.
    ///
    /// Lazy: nothing is pulled until the result is consumed, and element
    /// `n` of the source is never pulled.
    pub fn take(&self, n: usize) -> Self {
        let parent = self.clone();
        let source = Source::new(move || {
            let mut upstream = if n == 0 {
                Cursor::empty()
            } else {
                parent.restart()
            };
            let mut remaining = n;
            move || -> Result<Option<T>> {
                if remaining == 0 {
                    return Ok(None);
                }
                match upstream.pull()? {
                    Some(value) => {
                        remaining -= 1;
                        Ok(Some(value))
                    }
                    None => {
                        remaining = 0;
                        Ok(None)
                    }
                }
            }
        });
        Self::from_parts(source, self.length.truncate(n), CachePolicy::None)
    }

    /// Every element, in order.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.ensure_bounded("materialize")?;
        let capacity = self.length.upper_bound().unwrap_or(0).min(1 << 16);
        let mut out = Vec::with_capacity(capacity);
        let mut cursor = self.restart();
        while let Some(value) = cursor.pull()? {
            out.push(value);
        }
        Ok(out)
    }

    /// Refuse strict operations on infinite sequences.
    pub(crate) fn ensure_bounded(&self, operation: &'static str) -> Result<()> {
        if self.length.is_infinite() {
            return Err(SequenceError::UnboundedMaterialization { operation });
        }
        Ok(())
    }
}

/// Cursor that reads a memoized sequence through its cache.
struct CachedReader<T> {
    cache: Rc<Materializer<T>>,
    position: usize,
}

impl<T: Clone + 'static> Generator<T> for CachedReader<T> {
    fn pull(&mut self) -> Result<Option<T>> {
        match self.cache.get_in_order(self.position) {
            Ok(value) => {
                self.position += 1;
                Ok(Some(value))
            }
            Err(SequenceError::IndexOutOfRange { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Create a sequence from a generator factory and options.
///
/// ```
/// use sequence_engine::{make_sequence, Result, SequenceOptions};
///
/// let options = SequenceOptions::new().with_finite(3).with_memo(true);
/// let seq = make_sequence(
///     || {
///         let mut n = 0;
///         move || -> Result<Option<i32>> {
///             n += 1;
///             Ok(Some(n))
///         }
///     },
///     &options,
/// )
/// .unwrap();
///
/// assert_eq!(seq.to_vec().unwrap(), vec![1, 2, 3]);
/// ```
pub fn make_sequence<T, F, G>(factory: F, options: &SequenceOptions) -> Result<Sequence<T>>
where
    T: Clone + 'static,
    F: Fn() -> G + 'static,
    G: Generator<T> + 'static,
{
    Sequence::with_options(Source::new(factory), options)
}

impl<T> Clone for Sequence<T> {
    /// Shares source and cache; the clone gets its own fresh cursor.
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            length: self.length,
            cache: Rc::clone(&self.cache),
            cursor: None,
        }
    }
}

impl<T: Clone + 'static> IntoIterator for &Sequence<T> {
    type Item = Result<T>;
    type IntoIter = Cursor<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.restart()
    }
}

impl<T: Clone + 'static> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("length", &self.length)
            .field("policy", &self.cache.policy())
            .field("materialized", &self.cache.materialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_MEMO_BATCH;
    use crate::sources;
    use std::cell::Cell;

    fn counted_naturals(calls: Rc<Cell<usize>>) -> Source<u64> {
        Source::new(move || {
            let calls = Rc::clone(&calls);
            let mut n = 0u64;
            move || -> Result<Option<u64>> {
                calls.set(calls.get() + 1);
                n += 1;
                Ok(Some(n))
            }
        })
    }

    #[test]
    fn test_length_arithmetic() {
        assert_eq!(Length::Infinite.truncate(5), Length::Finite(5));
        assert_eq!(Length::Finite(3).truncate(5), Length::Finite(3));
        assert_eq!(Length::AtMost(9).truncate(5), Length::AtMost(5));
        assert_eq!(Length::Finite(3).skip(5), Length::Finite(0));
        assert_eq!(Length::Finite(3).filtered(), Length::AtMost(3));
        assert_eq!(Length::Finite(3).min(Length::Finite(2)), Length::Finite(2));
        assert_eq!(Length::Infinite.min(Length::Finite(2)), Length::Finite(2));
        assert_eq!(Length::Infinite.min(Length::Infinite), Length::Infinite);
        assert_eq!(Length::AtMost(4).min(Length::Finite(2)), Length::AtMost(2));
        assert_eq!(Length::AtMost(4).to_string(), "<=4");
    }

    #[test]
    fn test_next_and_rewind() {
        let mut seq = sources::naturals().take(3);
        assert_eq!(seq.next().unwrap(), Some(1));
        assert_eq!(seq.next().unwrap(), Some(2));
        seq.rewind();
        assert_eq!(seq.next().unwrap(), Some(1));
        assert_eq!(seq.next().unwrap(), Some(2));
        assert_eq!(seq.next().unwrap(), Some(3));
        assert_eq!(seq.next().unwrap(), None);
        assert_eq!(seq.next().unwrap(), None);
    }

    #[test]
    fn test_clones_have_independent_cursors() {
        let mut a = sources::naturals();
        a.next().unwrap();
        a.next().unwrap();

        let mut b = a.clone();
        assert_eq!(b.next().unwrap(), Some(1));
        assert_eq!(a.next().unwrap(), Some(3));
    }

    #[test]
    fn test_take_is_lazy() {
        let calls = Rc::new(Cell::new(0));
        let seq = Sequence::new(counted_naturals(Rc::clone(&calls)));

        let head = seq.take(4);
        assert_eq!(calls.get(), 0);
        assert_eq!(head.length(), Length::Finite(4));

        assert_eq!(head.to_vec().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(calls.get(), 4);

        assert!(seq.take(0).to_vec().unwrap().is_empty());
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_to_vec_refuses_infinite() {
        let err = sources::naturals().to_vec().unwrap_err();
        assert!(matches!(
            err,
            SequenceError::UnboundedMaterialization {
                operation: "materialize"
            }
        ));
    }

    #[test]
    fn test_finite_declaration() {
        let calls = Rc::new(Cell::new(0));
        let seq = Sequence::finite(counted_naturals(Rc::clone(&calls)), 5);
        assert_eq!(seq.len(), Some(5));
        assert_eq!(seq.to_vec().unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_memo_restart_reads_through_cache() {
        let calls = Rc::new(Cell::new(0));
        let seq = Sequence::finite(counted_naturals(Rc::clone(&calls)), 10).memoize();

        assert_eq!(seq.to_vec().unwrap().len(), 10);
        let after_first = calls.get();
        assert_eq!(after_first, 10);

        assert_eq!(seq.to_vec().unwrap().len(), 10);
        let mut cursor = seq.restart();
        assert_eq!(cursor.pull().unwrap(), Some(1));
        assert_eq!(calls.get(), after_first);
    }

    #[test]
    fn test_memo_iteration_does_not_prefetch() {
        let calls = Rc::new(Cell::new(0));
        let seq = Sequence::new(counted_naturals(Rc::clone(&calls))).memoize();

        assert_eq!(seq.take(3).to_vec().unwrap(), vec![1, 2, 3]);
        assert_eq!(calls.get(), 3);
        assert_eq!(seq.materialized(), 0..3);

        let pairs = seq.zip(&seq, |a, b| a + b).take(5).to_vec().unwrap();
        assert_eq!(pairs, vec![2, 4, 6, 8, 10]);
        assert_eq!(calls.get(), 5);

        // Indexed reads still prefetch a batch.
        seq.get(5).unwrap();
        assert_eq!(seq.materialized(), 0..5 + DEFAULT_MEMO_BATCH);
    }

    #[test]
    fn test_with_cache_validates() {
        let seq = sources::naturals();
        assert!(seq.with_cache(CachePolicy::window(0)).is_err());
        let windowed = seq.with_cache(CachePolicy::window(3)).unwrap();
        assert_eq!(windowed.cache_policy(), CachePolicy::window(3));
        assert_eq!(windowed.get(10).unwrap(), 11);
    }

    #[test]
    fn test_clones_share_cache() {
        let calls = Rc::new(Cell::new(0));
        let a = Sequence::new(counted_naturals(Rc::clone(&calls))).memoize();
        let b = a.clone();

        a.get(20).unwrap();
        let pulled = calls.get();
        assert_eq!(b.get(20).unwrap(), 21);
        assert_eq!(calls.get(), pulled);

        b.clear_cache();
        assert!(a.materialized().is_empty());
    }
}
