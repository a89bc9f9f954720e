//! Combinator layer.
//!
//! Lazy combinators (`map`, `filter`, `zip`, `skip`, `take_while`,
//! `enumerate`, `scale`) return a new [`Sequence`] whose source opens a
//! cursor over the parent on demand. They never pull anything at
//! construction time and can be chained without limit.
//!
//! Strict reducers (`reduce`, `fold`, `sum`, `product`, `count`, `min`,
//! `max`) consume a fresh cursor to the end and refuse to start on an
//! infinite sequence.
//!
//! # Hazard: filtering infinite sequences
//!
//! Each pull on a filtered sequence advances the parent until an element
//! passes. If no further element ever passes, the pull never returns. Bound
//! filtered infinite sequences with `take` and make sure enough elements
//! pass.

use super::lazy::Sequence;
use crate::cache::CachePolicy;
use crate::error::Result;
use crate::generator::Source;
use num_traits::{One, Zero};
use std::ops::{Add, Mul};
use std::rc::Rc;

impl<T: Clone + 'static> Sequence<T> {
    /// Element-wise transform; one parent pull per pull.
    pub fn map<U, F>(&self, f: F) -> Sequence<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        let parent = self.clone();
        let f = Rc::new(f);
        let source = Source::new(move || {
            let mut upstream = parent.restart();
            let f = Rc::clone(&f);
            move || -> Result<Option<U>> { Ok(upstream.pull()?.map(|x| f(x))) }
        });
        Sequence::from_parts(source, self.length(), CachePolicy::None)
    }

    /// Keep elements matching `pred`.
    ///
    /// See the module docs for the hazard on infinite sequences.
    pub fn filter<P>(&self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        let parent = self.clone();
        let pred = Rc::new(pred);
        let source = Source::new(move || {
            let mut upstream = parent.restart();
            let pred = Rc::clone(&pred);
            move || -> Result<Option<T>> {
                while let Some(value) = upstream.pull()? {
                    if pred(&value) {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
        });
        Self::from_parts(source, self.length().filtered(), CachePolicy::None)
    }

    /// Pairwise combination with `other`.
    ///
    /// The result has the length of the shorter operand. Each pull takes one
    /// element from `self` and then one from `other`; once `self` ends,
    /// `other` is not pulled again.
    pub fn zip<U, V, F>(&self, other: &Sequence<U>, f: F) -> Sequence<V>
    where
        U: Clone + 'static,
        V: Clone + 'static,
        F: Fn(T, U) -> V + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        let f = Rc::new(f);
        let source = Source::new(move || {
            let mut a = left.restart();
            let mut b = right.restart();
            let f = Rc::clone(&f);
            move || -> Result<Option<V>> {
                let Some(x) = a.pull()? else {
                    return Ok(None);
                };
                let Some(y) = b.pull()? else {
                    return Ok(None);
                };
                Ok(Some(f(x, y)))
            }
        });
        Sequence::from_parts(
            source,
            self.length().min(other.length()),
            CachePolicy::None,
        )
    }

    /// Drop the first `n` elements.
    pub fn skip(&self, n: usize) -> Self {
        let parent = self.clone();
        let source = Source::new(move || {
            let mut upstream = parent.restart();
            let mut pending = n;
            move || -> Result<Option<T>> {
                if pending > 0 {
                    let skipped = upstream.advance_by(pending)?;
                    pending -= skipped;
                    if pending > 0 {
                        pending = 0;
                        return Ok(None);
                    }
                }
                upstream.pull()
            }
        });
        Self::from_parts(source, self.length().skip(n), CachePolicy::None)
    }

    /// Elements up to, not including, the first that fails `pred`.
    ///
    /// An infinite parent yields an infinite result: whether `pred` ever
    /// fails is unknown until generation.
    pub fn take_while<P>(&self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        let parent = self.clone();
        let pred = Rc::new(pred);
        let source = Source::new(move || {
            let mut upstream = parent.restart();
            let pred = Rc::clone(&pred);
            let mut done = false;
            move || -> Result<Option<T>> {
                if done {
                    return Ok(None);
                }
                match upstream.pull()? {
                    Some(value) if pred(&value) => Ok(Some(value)),
                    _ => {
                        done = true;
                        Ok(None)
                    }
                }
            }
        });
        Self::from_parts(source, self.length().filtered(), CachePolicy::None)
    }

    /// Pair every element with its index.
    pub fn enumerate(&self) -> Sequence<(usize, T)> {
        let parent = self.clone();
        let source = Source::new(move || {
            let mut upstream = parent.restart();
            let mut index = 0usize;
            move || -> Result<Option<(usize, T)>> {
                Ok(upstream.pull()?.map(|value| {
                    let item = (index, value);
                    index += 1;
                    item
                }))
            }
        });
        Sequence::from_parts(source, self.length(), CachePolicy::None)
    }

    /// Multiply every element by `factor`.
    pub fn scale(&self, factor: T) -> Self
    where
        T: Mul<Output = T>,
    {
        self.map(move |x| x * factor.clone())
    }

    /// Fold every element into an accumulator, starting from `init`.
    ///
    /// Fails with `UnboundedMaterialization` on an infinite sequence.
    pub fn reduce<A, F>(&self, f: F, init: A) -> Result<A>
    where
        F: FnMut(A, T) -> A,
    {
        self.ensure_bounded("reduce")?;
        let mut f = f;
        let mut acc = init;
        let mut cursor = self.restart();
        while let Some(value) = cursor.pull()? {
            acc = f(acc, value);
        }
        Ok(acc)
    }

    /// [`reduce`](Self::reduce) with the argument order of `Iterator::fold`.
    pub fn fold<A, F>(&self, init: A, f: F) -> Result<A>
    where
        F: FnMut(A, T) -> A,
    {
        self.reduce(f, init)
    }

    /// Sum of all elements.
    pub fn sum(&self) -> Result<T>
    where
        T: Zero + Add<Output = T>,
    {
        self.reduce(|acc, x| acc + x, T::zero())
    }

    /// Product of all elements.
    pub fn product(&self) -> Result<T>
    where
        T: One + Mul<Output = T>,
    {
        self.reduce(|acc, x| acc * x, T::one())
    }

    /// Number of elements.
    pub fn count(&self) -> Result<usize> {
        self.reduce(|n, _| n + 1, 0)
    }

    /// Smallest element, `None` for an empty sequence.
    pub fn min(&self) -> Result<Option<T>>
    where
        T: PartialOrd,
    {
        self.reduce(
            |best: Option<T>, x| match best {
                Some(b) if b <= x => Some(b),
                _ => Some(x),
            },
            None,
        )
    }

    /// Largest element, `None` for an empty sequence.
    pub fn max(&self) -> Result<Option<T>>
    where
        T: PartialOrd,
    {
        self.reduce(
            |best: Option<T>, x| match best {
                Some(b) if b >= x => Some(b),
                _ => Some(x),
            },
            None,
        )
    }
}
