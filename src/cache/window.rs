//! Sliding-window cache.
//!
//! Holds the most recent `size` produced elements as
//! `[window_start, window_end)`. Reading ahead of the window shifts it
//! forward, pulling only the elements between the old `window_end` and the
//! requested index and evicting from the front. Reading behind the window
//! cannot be served incrementally: the window is rebuilt from index 0.

use super::{pull_into, CacheState};
use crate::error::{Result, SequenceError};
use crate::generator::Source;

/// Move the window so that it contains `index`.
pub(super) fn shift<T: 'static>(
    state: &mut CacheState<T>,
    source: &Source<T>,
    size: usize,
    index: usize,
) -> Result<()> {
    if index < state.view.base {
        log::debug!(
            "sliding window [{}, {}) regenerating from 0 for index {}",
            state.view.base,
            state.view.end(),
            index
        );
        state.view.reset();
        state.cursor = None;
        state.stats.regenerations += 1;
    }

    let from = state.view.end();
    log::trace!("sliding window shift from {} to cover {}", from, index);

    let mut cursor = state.cursor.take().unwrap_or_else(|| source.open());
    let mut outcome = Ok(());
    while state.view.end() <= index {
        match pull_into(state, &mut cursor) {
            Ok(true) => {
                if state.view.items.len() > size {
                    state.view.items.pop_front();
                    state.view.base += 1;
                    state.stats.evictions += 1;
                }
            }
            Ok(false) => {
                outcome = Err(SequenceError::IndexOutOfRange {
                    index,
                    length: Some(state.view.end()),
                });
                break;
            }
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }
    state.cursor = Some(cursor);
    outcome
}

#[cfg(test)]
mod tests {
    use crate::cache::{CachePolicy, Materializer};
    use crate::error::{Result, SequenceError};
    use crate::generator::Source;
    use crate::sequence::Length;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counted(calls: Rc<Cell<usize>>) -> Source<u64> {
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

    fn window(size: usize, calls: &Rc<Cell<usize>>) -> Materializer<u64> {
        Materializer::new(
            counted(Rc::clone(calls)),
            Length::Infinite,
            CachePolicy::window(size),
        )
    }

    #[test]
    fn test_window_holds_most_recent_elements() {
        let calls = Rc::new(Cell::new(0));
        let m = window(4, &calls);

        assert_eq!(m.get(9).unwrap(), 10);
        assert_eq!(m.materialized(), 6..10);
        assert_eq!(m.stats().evictions, 6);
    }

    #[test]
    fn test_in_window_reads_do_not_pull() {
        let calls = Rc::new(Cell::new(0));
        let m = window(8, &calls);

        m.get(20).unwrap();
        let pulled = calls.get();
        for i in 13..=20 {
            assert_eq!(m.get(i).unwrap(), i as u64 + 1);
        }
        assert_eq!(calls.get(), pulled);
    }

    #[test]
    fn test_forward_shift_costs_the_index_delta() {
        let calls = Rc::new(Cell::new(0));
        let m = window(16, &calls);

        m.get(1000).unwrap();
        assert_eq!(calls.get(), 1001);

        m.get(1010).unwrap();
        assert_eq!(calls.get(), 1011);

        m.get(1011).unwrap();
        assert_eq!(calls.get(), 1012);
        assert_eq!(m.stats().regenerations, 0);
    }

    #[test]
    fn test_behind_window_regenerates_from_zero() {
        let calls = Rc::new(Cell::new(0));
        let m = window(5, &calls);

        assert_eq!(m.get(0).unwrap(), 1);
        assert_eq!(m.get(100).unwrap(), 101);
        assert_eq!(m.materialized(), 96..101);

        assert_eq!(m.get(0).unwrap(), 1);
        assert_eq!(m.materialized(), 0..1);
        assert_eq!(m.stats().regenerations, 1);
        assert_eq!(calls.get(), 102);

        // Subsequent in-window reads are correct again.
        assert_eq!(m.get(3).unwrap(), 4);
        assert_eq!(m.get(1).unwrap(), 2);
        assert_eq!(m.materialized(), 0..4);
    }

    #[test]
    fn test_window_end_of_finite_source() {
        let source = Source::from_iterator(|| 1..=3u64);
        let m = Materializer::new(source, Length::AtMost(10), CachePolicy::window(2));

        assert_eq!(m.get(2).unwrap(), 3);
        assert!(matches!(
            m.get(5),
            Err(SequenceError::IndexOutOfRange {
                index: 5,
                length: Some(3)
            })
        ));
        assert_eq!(m.get(1).unwrap(), 2);
    }
}
