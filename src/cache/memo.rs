//! Grow-only memoization.
//!
//! The first miss on an empty buffer materializes exactly the requested
//! prefix. Every later miss materializes at least `batch` new elements so
//! the fixed cost of an extension is amortized across many future reads.
//! Elements past the requested index are speculative: if the generator
//! fails while producing them, the batch simply stops short and the failing
//! index is tried again by a later miss.

use super::{pull_into, CacheState, MAX_MEMO_BATCH};
use crate::error::{Result, SequenceError};
use crate::generator::Source;
use crate::sequence::Length;

/// Extend the buffer so that it covers `index`.
pub(super) fn extend<T: 'static>(
    state: &mut CacheState<T>,
    source: &Source<T>,
    length: Length,
    batch: usize,
    index: usize,
) -> Result<()> {
    let len = state.view.end();
    let required = index
        .checked_add(1)
        .ok_or(SequenceError::IndexOutOfRange {
            index,
            length: None,
        })?;
    let mut target = if len == 0 {
        required
    } else {
        required.max(len.saturating_add(batch.min(MAX_MEMO_BATCH)))
    };
    if let Some(bound) = length.upper_bound() {
        target = target.min(bound);
    }

    log::trace!("memo extend {}..{} (requested {})", len, target, index);

    let mut cursor = state.cursor.take().unwrap_or_else(|| source.open());
    let mut outcome = Ok(());
    while state.view.end() < target {
        match pull_into(state, &mut cursor) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) if state.view.end() < required => {
                outcome = Err(err);
                break;
            }
            Err(err) => {
                log::trace!(
                    "memo prefetch stopped at {} after generator error: {}",
                    state.view.end(),
                    err
                );
                break;
            }
        }
    }
    state.cursor = Some(cursor);
    outcome?;

    if state.view.end() < required {
        return Err(SequenceError::IndexOutOfRange {
            index,
            length: Some(state.view.end()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cache::{CachePolicy, Materializer, MAX_MEMO_BATCH};
    use crate::error::{Result, SequenceError};
    use crate::generator::Source;
    use crate::sequence::Length;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counted(calls: Rc<Cell<usize>>, limit: Option<u64>) -> Source<u64> {
        Source::new(move || {
            let calls = Rc::clone(&calls);
            let mut n = 0u64;
            move || -> Result<Option<u64>> {
                calls.set(calls.get() + 1);
                if Some(n) == limit {
                    return Ok(None);
                }
                n += 1;
                Ok(Some(n))
            }
        })
    }

    #[test]
    fn test_cold_start_is_exact() {
        let calls = Rc::new(Cell::new(0));
        let m = Materializer::new(
            counted(Rc::clone(&calls), None),
            Length::Infinite,
            CachePolicy::Memo { batch: 16 },
        );

        assert_eq!(m.get(5).unwrap(), 6);
        assert_eq!(calls.get(), 6);
        assert_eq!(m.materialized(), 0..6);
    }

    #[test]
    fn test_warm_miss_materializes_a_batch() {
        let calls = Rc::new(Cell::new(0));
        let m = Materializer::new(
            counted(Rc::clone(&calls), None),
            Length::Infinite,
            CachePolicy::Memo { batch: 16 },
        );

        m.get(0).unwrap();
        assert_eq!(m.get(1).unwrap(), 2);
        assert_eq!(m.materialized(), 0..17);
        assert_eq!(calls.get(), 17);

        // Everything in the batch is now a hit.
        for i in 0..17 {
            assert_eq!(m.get(i).unwrap(), i as u64 + 1);
        }
        assert_eq!(calls.get(), 17);
        assert_eq!(m.stats().misses, 2);
    }

    #[test]
    fn test_huge_batch_is_clamped() {
        let calls = Rc::new(Cell::new(0));
        let m = Materializer::new(
            counted(Rc::clone(&calls), None),
            Length::Infinite,
            CachePolicy::Memo { batch: usize::MAX },
        );

        m.get(0).unwrap();
        assert_eq!(m.get(1).unwrap(), 2);
        assert_eq!(m.materialized(), 0..1 + MAX_MEMO_BATCH);
        assert_eq!(calls.get(), 1 + MAX_MEMO_BATCH);
    }

    #[test]
    fn test_max_index_is_out_of_range() {
        let calls = Rc::new(Cell::new(0));
        let m = Materializer::new(
            counted(Rc::clone(&calls), None),
            Length::Infinite,
            CachePolicy::memo(),
        );

        assert!(matches!(
            m.get(usize::MAX),
            Err(SequenceError::IndexOutOfRange {
                index: usize::MAX,
                length: None
            })
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_far_miss_covers_requested_index() {
        let calls = Rc::new(Cell::new(0));
        let m = Materializer::new(
            counted(Rc::clone(&calls), None),
            Length::Infinite,
            CachePolicy::Memo { batch: 4 },
        );

        m.get(0).unwrap();
        assert_eq!(m.get(100).unwrap(), 101);
        assert_eq!(m.materialized(), 0..101);
    }

    #[test]
    fn test_batch_clipped_to_declared_length() {
        let calls = Rc::new(Cell::new(0));
        let m = Materializer::new(
            counted(Rc::clone(&calls), None).declared(10),
            Length::Finite(10),
            CachePolicy::Memo { batch: 64 },
        );

        m.get(0).unwrap();
        m.get(1).unwrap();
        assert_eq!(m.materialized(), 0..10);
        assert_eq!(calls.get(), 10);
    }

    #[test]
    fn test_source_end_is_remembered() {
        let calls = Rc::new(Cell::new(0));
        let m = Materializer::new(
            counted(Rc::clone(&calls), Some(3)),
            Length::Infinite,
            CachePolicy::memo(),
        );

        assert!(matches!(
            m.get(5),
            Err(SequenceError::IndexOutOfRange {
                index: 5,
                length: Some(3)
            })
        ));
        let after_first = calls.get();

        assert!(m.get(7).is_err());
        assert_eq!(calls.get(), after_first);
        assert_eq!(m.get(2).unwrap(), 3);
    }

    #[test]
    fn test_speculative_error_does_not_fail_request() {
        let source = Source::new(|| {
            let mut n = 0u64;
            move || -> Result<Option<u64>> {
                n += 1;
                if n == 4 {
                    return Err(SequenceError::generator_msg("bad element"));
                }
                Ok(Some(n))
            }
        });
        let m = Materializer::new(source, Length::Infinite, CachePolicy::Memo { batch: 8 });

        assert_eq!(m.get(0).unwrap(), 1);
        // Warm miss for index 1 prefetches, hits the error at the 4th pull,
        // and still answers.
        assert_eq!(m.get(1).unwrap(), 2);
        assert_eq!(m.materialized(), 0..3);
    }

    #[test]
    fn test_required_error_propagates_and_is_not_cached() {
        let source = Source::new(|| {
            let mut attempts = 0u32;
            let mut n = 0u64;
            move || -> Result<Option<u64>> {
                if n == 2 && attempts == 0 {
                    attempts += 1;
                    return Err(SequenceError::generator_msg("transient"));
                }
                n += 1;
                Ok(Some(n))
            }
        });
        let m = Materializer::new(source, Length::Infinite, CachePolicy::memo());

        let err = m.get(2).unwrap_err();
        assert!(err.is_generator_error());
        assert_eq!(m.materialized(), 0..2);

        assert_eq!(m.get(2).unwrap(), 3);
    }
}
