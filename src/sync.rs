//! Thread-safe memoized sequence.
//!
//! [`Sequence`](crate::Sequence) is single-threaded. When a memoized table
//! has to be shared across threads, [`SharedMemo`] offers the same grow-only
//! semantics behind locks:
//!
//! ```text
//! get(i) ──► items.read() ──hit──► clone
//!                │
//!               miss
//!                ▼
//!          writer.lock()        one extender at a time
//!                │
//!          re-check items       another thread may have filled it
//!                │
//!          pull batch           readers are not blocked meanwhile
//!                │
//!          items.write()        brief: append only
//! ```
//!
//! Every element is pulled from the generator exactly once, no matter how
//! many threads miss on it concurrently.

use crate::cache::{DEFAULT_MEMO_BATCH, MAX_MEMO_BATCH};
use crate::error::{Result, SequenceError};
use crate::generator::Generator;
use crate::sequence::Length;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type SendGenerator<T> = Box<dyn Generator<T> + Send>;
type Factory<T> = Arc<dyn Fn() -> SendGenerator<T> + Send + Sync>;

/// Extension state, owned by whichever thread holds the writer lock.
struct Writer<T> {
    generator: Option<SendGenerator<T>>,
    exhausted_at: Option<usize>,
}

/// `Send + Sync` grow-only memoized sequence.
pub struct SharedMemo<T> {
    items: RwLock<Vec<T>>,
    writer: Mutex<Writer<T>>,
    factory: Factory<T>,
    declared: Option<usize>,
    batch: usize,
    generated: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> SharedMemo<T> {
    /// Infinite memoized sequence over a generator factory.
    pub fn new<F, G>(factory: F) -> Self
    where
        F: Fn() -> G + Send + Sync + 'static,
        G: Generator<T> + Send + 'static,
    {
        Self {
            items: RwLock::new(Vec::new()),
            writer: Mutex::new(Writer {
                generator: None,
                exhausted_at: None,
            }),
            factory: Arc::new(move || Box::new(factory()) as SendGenerator<T>),
            declared: None,
            batch: DEFAULT_MEMO_BATCH,
            generated: AtomicU64::new(0),
        }
    }

    /// Memoized sequence with a declared exact length.
    pub fn finite<F, G>(factory: F, n: usize) -> Self
    where
        F: Fn() -> G + Send + Sync + 'static,
        G: Generator<T> + Send + 'static,
    {
        let mut memo = Self::new(factory);
        memo.declared = Some(n);
        memo
    }

    /// Override the batch size.
    pub fn with_batch(mut self, batch: usize) -> Result<Self> {
        if batch == 0 {
            return Err(SequenceError::InvalidCacheConfig(
                "memo batch size must be > 0".to_string(),
            ));
        }
        self.batch = batch;
        Ok(self)
    }

    /// Length marker.
    pub fn length(&self) -> Length {
        match self.declared {
            Some(n) => Length::Finite(n),
            None => Length::Infinite,
        }
    }

    /// Number of elements materialized so far.
    pub fn materialized_len(&self) -> usize {
        self.items.read().len()
    }

    /// Elements pulled from the generator so far.
    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    /// Indexed read.
    #[inline]
    pub fn get(&self, index: usize) -> Result<T> {
        if let Some(value) = self.items.read().get(index) {
            return Ok(value.clone());
        }
        self.extend_to(index)
    }

    #[cold]
    fn extend_to(&self, index: usize) -> Result<T> {
        if let Some(n) = self.declared {
            if index >= n {
                return Err(SequenceError::IndexOutOfRange {
                    index,
                    length: Some(n),
                });
            }
        }

        let mut writer = self.writer.lock();

        // Filled while we waited for the writer lock.
        let len = {
            let items = self.items.read();
            if let Some(value) = items.get(index) {
                return Ok(value.clone());
            }
            items.len()
        };
        if let Some(end) = writer.exhausted_at {
            return Err(self.past_end(index, end));
        }

        let required = index
            .checked_add(1)
            .ok_or(SequenceError::IndexOutOfRange {
                index,
                length: None,
            })?;
        let mut target = if len == 0 {
            required
        } else {
            required.max(len.saturating_add(self.batch.min(MAX_MEMO_BATCH)))
        };
        if let Some(n) = self.declared {
            target = target.min(n);
        }
        log::trace!("shared memo extend {}..{} (requested {})", len, target, index);

        let factory = &self.factory;
        let generator = writer.generator.get_or_insert_with(|| factory());
        let mut fresh = Vec::with_capacity((target - len).min(MAX_MEMO_BATCH));
        let mut ended = false;
        let mut failure = None;
        while len + fresh.len() < target {
            match generator.pull() {
                Ok(Some(value)) => fresh.push(value),
                Ok(None) => {
                    ended = true;
                    break;
                }
                Err(err) => {
                    if len + fresh.len() < required {
                        failure = Some(err);
                    }
                    break;
                }
            }
        }

        let end = len + fresh.len();
        self.generated
            .fetch_add(fresh.len() as u64, Ordering::Relaxed);
        let value = fresh.get(index.wrapping_sub(len)).cloned();
        self.items.write().extend(fresh);

        if ended {
            writer.exhausted_at = Some(end);
        }
        if let Some(err) = failure {
            return Err(err);
        }
        match value {
            Some(value) => Ok(value),
            None => Err(self.past_end(index, end)),
        }
    }

    /// Error for a read at or past the generator's end.
    fn past_end(&self, index: usize, end: usize) -> SequenceError {
        match self.declared {
            Some(declared) => SequenceError::GeneratorExhausted {
                position: end,
                declared,
            },
            None => SequenceError::IndexOutOfRange {
                index,
                length: Some(end),
            },
        }
    }

    /// Elements `0..n`, materializing as needed.
    pub fn prefix(&self, n: usize) -> Result<Vec<T>> {
        if n > 0 {
            self.get(n - 1)?;
        }
        Ok(self.items.read()[..n].to_vec())
    }
}

impl<T> fmt::Debug for SharedMemo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMemo")
            .field("declared", &self.declared)
            .field("batch", &self.batch)
            .field("materialized", &self.items.read().len())
            .finish()
    }
}
