//! Stock generators.
//!
//! Domain producers (primes, residue spaces, tree walks, geometric samplers)
//! live outside the engine and only need to implement
//! [`Generator`](crate::generator::Generator). The producers here cover the
//! common shapes and are what the tests and benchmarks are built on.
//!
//! | function | elements | length |
//! |----------|----------|--------|
//! | [`naturals`] | 1, 2, 3, ... | infinite |
//! | [`integers_from`] | start, start + 1, ... | infinite |
//! | [`range`] | start..end by step | finite |
//! | [`linspace`] | `count` evenly spaced reals | finite |
//! | [`from_vec`] | the vector's elements | finite |
//! | [`tabulate`] | f(0), f(1), ... | infinite |
//! | [`try_tabulate`] | fallible `tabulate` | infinite |
//! | [`iterate`] | seed, f(seed), f(f(seed)), ... | infinite |
//! | [`repeat`] | value, value, ... | infinite |
//! | [`from_fn`] | any generator factory | infinite |

use crate::error::{Result, SequenceError};
use crate::generator::{Generator, Source};
use crate::sequence::Sequence;
use std::rc::Rc;

/// Natural numbers starting at 1.
pub fn naturals() -> Sequence<u64> {
    Sequence::new(Source::new(|| {
        let mut n = 0u64;
        move || -> Result<Option<u64>> {
            n += 1;
            Ok(Some(n))
        }
    }))
}

/// Consecutive integers starting at `start`.
pub fn integers_from(start: i64) -> Sequence<i64> {
    Sequence::new(Source::new(move || {
        let mut next = start;
        move || -> Result<Option<i64>> {
            let value = next;
            next += 1;
            Ok(Some(value))
        }
    }))
}

/// Integers from `start` (inclusive) to `end` (exclusive) by `step`.
///
/// A negative `step` counts down. An empty range yields an empty sequence.
///
/// # Panics
///
/// Panics if `step` is zero.
pub fn range(start: i64, end: i64, step: i64) -> Sequence<i64> {
    assert!(step != 0, "range step must be non-zero");
    let count = if step > 0 && start < end {
        ((end - start - 1) / step + 1) as usize
    } else if step < 0 && start > end {
        ((start - end - 1) / -step + 1) as usize
    } else {
        0
    };
    let source = Source::new(move || {
        let mut produced = 0usize;
        move || -> Result<Option<i64>> {
            if produced == count {
                return Ok(None);
            }
            let value = start + step * produced as i64;
            produced += 1;
            Ok(Some(value))
        }
    });
    Sequence::finite(source, count)
}

/// `count` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Sequence<f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    let source = Source::new(move || {
        let mut i = 0usize;
        move || -> Result<Option<f64>> {
            if i == count {
                return Ok(None);
            }
            let value = if i + 1 == count && count > 1 {
                end
            } else {
                start + step * i as f64
            };
            i += 1;
            Ok(Some(value))
        }
    });
    Sequence::finite(source, count)
}

/// The elements of `items`, shared by every cursor.
pub fn from_vec<T: Clone + 'static>(items: Vec<T>) -> Sequence<T> {
    let len = items.len();
    let items: Rc<[T]> = items.into();
    let source = Source::new(move || {
        let items = Rc::clone(&items);
        let mut i = 0usize;
        move || -> Result<Option<T>> {
            let value = items.get(i).cloned();
            i += 1;
            Ok(value)
        }
    });
    Sequence::finite(source, len)
}

/// `f(0), f(1), f(2), ...`
pub fn tabulate<T, F>(f: F) -> Sequence<T>
where
    T: Clone + 'static,
    F: Fn(usize) -> T + 'static,
{
    let f = Rc::new(f);
    Sequence::new(Source::new(move || {
        let f = Rc::clone(&f);
        let mut i = 0usize;
        move || -> Result<Option<T>> {
            let value = f(i);
            i += 1;
            Ok(Some(value))
        }
    }))
}

/// Fallible [`tabulate`]: an `Err` from `f` surfaces as
/// [`SequenceError::Generator`] at the pull that triggered it.
///
/// A failed index is retried on the next pull.
pub fn try_tabulate<T, E, F>(f: F) -> Sequence<T>
where
    T: Clone + 'static,
    E: std::error::Error + Send + Sync + 'static,
    F: Fn(usize) -> std::result::Result<T, E> + 'static,
{
    let f = Rc::new(f);
    Sequence::new(Source::new(move || {
        let f = Rc::clone(&f);
        let mut i = 0usize;
        move || -> Result<Option<T>> {
            let value = f(i).map_err(SequenceError::generator)?;
            i += 1;
            Ok(Some(value))
        }
    }))
}

/// `seed, f(seed), f(f(seed)), ...`
pub fn iterate<T, F>(seed: T, f: F) -> Sequence<T>
where
    T: Clone + 'static,
    F: Fn(&T) -> T + 'static,
{
    let f = Rc::new(f);
    Sequence::new(Source::new(move || {
        let f = Rc::clone(&f);
        let mut next = Some(seed.clone());
        move || -> Result<Option<T>> {
            let current = next.take();
            if let Some(value) = &current {
                next = Some(f(value));
            }
            Ok(current)
        }
    }))
}

/// `value` forever.
pub fn repeat<T: Clone + 'static>(value: T) -> Sequence<T> {
    Sequence::new(Source::new(move || {
        let value = value.clone();
        move || -> Result<Option<T>> { Ok(Some(value.clone())) }
    }))
}

/// Any generator factory, as an infinite uncached sequence.
///
/// Use [`make_sequence`](crate::make_sequence) or the
/// [`SequenceBuilder`](crate::SequenceBuilder) to declare a length or a cache.
pub fn from_fn<T, F, G>(factory: F) -> Sequence<T>
where
    T: Clone + 'static,
    F: Fn() -> G + 'static,
    G: Generator<T> + 'static,
{
    Sequence::new(Source::new(factory))
}
