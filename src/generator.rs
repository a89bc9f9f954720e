//! Generator contract.
//!
//! A [`Generator`] is a self-advancing pull function: every call to
//! [`Generator::pull`] yields the next element (`Ok(Some(_))`), the end
//! marker (`Ok(None)`), or an adapter failure (`Err(_)`).
//!
//! Sequences never hold a generator directly. They hold a [`Source`], a
//! shared factory that opens a fresh generator on demand, wrapped in a
//! [`Cursor`]. Every consumer that iterates a sequence gets its own cursor,
//! so two consumers can never corrupt each other's position.
//!
//! Any `FnMut() -> Result<Option<T>>` closure is a generator:
//!
//! ```
//! use sequence_engine::generator::{Cursor, Source};
//! use sequence_engine::Result;
//!
//! let squares = Source::new(|| {
//!     let mut n = 0u64;
//!     move || -> Result<Option<u64>> {
//!         n += 1;
//!         Ok(Some(n * n))
//!     }
//! });
//!
//! let mut cursor = squares.open();
//! assert_eq!(cursor.pull().unwrap(), Some(1));
//! assert_eq!(cursor.pull().unwrap(), Some(4));
//!
//! // A second cursor starts over.
//! assert_eq!(squares.open().pull().unwrap(), Some(1));
//! ```

use crate::error::{Result, SequenceError};
use std::fmt;
use std::rc::Rc;

/// Pull-based element producer.
///
/// Implementations must be deterministic for a given pull order and free of
/// observable side effects, unless documented otherwise; caching is only
/// transparent for generators that honor this.
pub trait Generator<T> {
    /// Produce the next element, or `None` once the generator has ended.
    fn pull(&mut self) -> Result<Option<T>>;
}

impl<T, F> Generator<T> for F
where
    F: FnMut() -> Result<Option<T>>,
{
    #[inline]
    fn pull(&mut self) -> Result<Option<T>> {
        self()
    }
}

/// A positioned, fused handle over one generator instance.
///
/// Once the underlying generator reports the end marker the cursor never
/// pulls it again. An `Err` does not end the cursor: the next pull reaches
/// the generator again.
pub struct Cursor<T> {
    inner: Box<dyn Generator<T>>,
    position: usize,
    finished: bool,
}

impl<T> Cursor<T> {
    /// Wrap a generator.
    pub fn new<G>(generator: G) -> Self
    where
        G: Generator<T> + 'static,
    {
        Self {
            inner: Box::new(generator),
            position: 0,
            finished: false,
        }
    }

    /// A cursor that is already at its end.
    pub fn empty() -> Self
    where
        T: 'static,
    {
        let mut cursor = Self::new(|| -> Result<Option<T>> { Ok(None) });
        cursor.finished = true;
        cursor
    }

    /// Pull the next element.
    #[inline]
    pub fn pull(&mut self) -> Result<Option<T>> {
        if self.finished {
            return Ok(None);
        }
        match self.inner.pull()? {
            Some(value) => {
                self.position += 1;
                Ok(Some(value))
            }
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    /// Number of elements this cursor has produced so far.
    #[inline]
    pub fn produced(&self) -> usize {
        self.position
    }

    /// True once the generator has reported its end.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pull and discard up to `n` elements.
    ///
    /// Returns how many were actually discarded, which is less than `n` only
    /// if the generator ended.
    pub fn advance_by(&mut self, n: usize) -> Result<usize> {
        for skipped in 0..n {
            if self.pull()?.is_none() {
                return Ok(skipped);
            }
        }
        Ok(n)
    }

    /// Pull the element `n` positions ahead of the current one.
    pub fn pull_nth(&mut self, n: usize) -> Result<Option<T>> {
        if self.advance_by(n)? < n {
            return Ok(None);
        }
        self.pull()
    }
}

impl<T> Generator<T> for Cursor<T> {
    #[inline]
    fn pull(&mut self) -> Result<Option<T>> {
        Cursor::pull(self)
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull().transpose()
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("finished", &self.finished)
            .finish()
    }
}

/// Shared, restartable generator factory.
///
/// Cloning a `Source` is O(1); every clone opens cursors over the same
/// logical stream.
pub struct Source<T> {
    open: Rc<dyn Fn() -> Cursor<T>>,
}

impl<T: 'static> Source<T> {
    /// Build a source from a factory returning fresh generators.
    pub fn new<F, G>(factory: F) -> Self
    where
        F: Fn() -> G + 'static,
        G: Generator<T> + 'static,
    {
        Self {
            open: Rc::new(move || Cursor::new(factory())),
        }
    }

    /// Build a source from a factory returning fresh iterators.
    pub fn from_iterator<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::new(move || {
            let mut iter = factory().into_iter();
            move || -> Result<Option<T>> { Ok(iter.next()) }
        })
    }

    /// Open a fresh cursor positioned before the first element.
    #[inline]
    pub fn open(&self) -> Cursor<T> {
        (self.open)()
    }

    /// Restrict the source to exactly `declared` elements.
    ///
    /// Cursors stop after `declared` elements without pulling further. A
    /// generator that ends early makes the cursor report
    /// [`SequenceError::GeneratorExhausted`].
    pub fn declared(self, declared: usize) -> Self {
        Self::new(move || {
            let mut inner = self.open();
            move || -> Result<Option<T>> {
                if inner.produced() >= declared {
                    return Ok(None);
                }
                match inner.pull()? {
                    Some(value) => Ok(Some(value)),
                    None => Err(SequenceError::GeneratorExhausted {
                        position: inner.produced(),
                        declared,
                    }),
                }
            }
        })
    }
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            open: Rc::clone(&self.open),
        }
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Source { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_source(limit: u32) -> Source<u32> {
        Source::new(move || {
            let mut n = 0;
            move || -> Result<Option<u32>> {
                if n == limit {
                    return Ok(None);
                }
                n += 1;
                Ok(Some(n))
            }
        })
    }

    #[test]
    fn test_cursor_is_fused() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut cursor = Cursor::new(move || -> Result<Option<u8>> {
            counter.set(counter.get() + 1);
            Ok(None)
        });

        assert_eq!(cursor.pull().unwrap(), None);
        assert_eq!(cursor.pull().unwrap(), None);
        assert!(cursor.is_finished());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_cursor_error_does_not_finish() {
        let mut attempts = 0;
        let mut cursor = Cursor::new(move || -> Result<Option<u8>> {
            attempts += 1;
            if attempts == 1 {
                Err(SequenceError::generator_msg("flaky"))
            } else {
                Ok(Some(7))
            }
        });

        assert!(cursor.pull().is_err());
        assert!(!cursor.is_finished());
        assert_eq!(cursor.pull().unwrap(), Some(7));
        assert_eq!(cursor.produced(), 1);
    }

    #[test]
    fn test_source_cursors_are_independent() {
        let source = counting_source(5);
        let mut a = source.open();
        let mut b = source.open();

        assert_eq!(a.pull().unwrap(), Some(1));
        assert_eq!(a.pull().unwrap(), Some(2));
        assert_eq!(b.pull().unwrap(), Some(1));
        assert_eq!(a.pull().unwrap(), Some(3));
    }

    #[test]
    fn test_produced_through_mutable_borrow() {
        fn drain_two(cursor: &mut Cursor<u32>) -> usize {
            cursor.by_ref().take(2).for_each(drop);
            cursor.produced()
        }

        let mut cursor = counting_source(5).open();
        assert_eq!(drain_two(&mut cursor), 2);
        assert_eq!(cursor.produced(), 2);
    }

    #[test]
    fn test_advance_and_pull_nth() {
        let mut cursor = counting_source(5).open();
        assert_eq!(cursor.advance_by(2).unwrap(), 2);
        assert_eq!(cursor.pull_nth(1).unwrap(), Some(4));
        assert_eq!(cursor.advance_by(10).unwrap(), 1);
        assert_eq!(cursor.pull().unwrap(), None);
    }

    #[test]
    fn test_declared_source_truncates() {
        let source = counting_source(10).declared(3);
        let values: Vec<u32> = source.open().collect::<Result<_>>().unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_declared_source_reports_early_end() {
        let source = counting_source(2).declared(4);
        let mut cursor = source.open();
        assert_eq!(cursor.pull().unwrap(), Some(1));
        assert_eq!(cursor.pull().unwrap(), Some(2));
        match cursor.pull() {
            Err(SequenceError::GeneratorExhausted { position, declared }) => {
                assert_eq!(position, 2);
                assert_eq!(declared, 4);
            }
            other => panic!("expected GeneratorExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_from_iterator() {
        let source = Source::from_iterator(|| vec!['a', 'b']);
        let collected: Vec<char> = source.open().collect::<Result<_>>().unwrap();
        assert_eq!(collected, vec!['a', 'b']);
    }
}
