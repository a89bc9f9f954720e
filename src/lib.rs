//! Sequence Engine
//!
//! Lazy, restartable sequences with composable combinators and pluggable
//! cache policies.
//!
//! # Overview
//!
//! A [`Sequence`] wraps a generator *factory* rather than a generator, so
//! every consumer can restart it from the beginning. Elements are produced
//! only when something asks for them:
//!
//! - **Lazy combinators**: `map`, `filter`, `zip`, `take`, `skip`,
//!   `take_while`, `enumerate`, `scale` build new sequences and pull nothing
//! - **Strict operations**: `reduce`, `sum`, `count`, `to_vec` consume a
//!   bounded sequence and refuse infinite ones
//! - **Indexed access**: `get(i)` served from a cache whose policy is chosen
//!   at construction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Sequence Engine                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  generator/  - Generator trait, cursors, restartable sources    │
//! │  sequence/   - Sequence core and combinators                    │
//! │  cache/      - Materializer: none, memo, sliding window         │
//! │  sources/    - Stock generators                                 │
//! │  config/     - Serializable options (TOML / JSON)               │
//! │  builder/    - Fluent construction                              │
//! │  registry/   - Named shared sequences                           │
//! │  sync/       - Thread-safe memoized sequence                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Cache Policies
//!
//! | Policy | `get(i)` on a miss | Memory |
//! |--------|--------------------|--------|
//! | none | regenerate from 0 | O(1) |
//! | memo | resume, batch ahead | O(max index) |
//! | sliding window `W` | resume ahead, regenerate behind | O(W) |
//!
//! A hit is a borrow-flag check, a bounds check and a buffer read under
//! every policy.
//!
//! # Example
//!
//! ```
//! use sequence_engine::{sources, SequenceBuilder};
//!
//! let squares = sources::naturals().map(|x| x * x);
//! assert_eq!(squares.take(10).sum().unwrap(), 385);
//!
//! let table = SequenceBuilder::new()
//!     .memo()
//!     .build_from_fn(|| {
//!         let mut n = 0u64;
//!         move || -> sequence_engine::Result<Option<u64>> {
//!             n += 1;
//!             Ok(Some(n * n))
//!         }
//!     })
//!     .unwrap();
//! assert_eq!(table.get(99).unwrap(), 10_000);
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod prelude;
pub mod registry;
pub mod sequence;
pub mod sources;
pub mod sync;

// Re-exports - Core
pub use generator::{Cursor, Generator, Source};
pub use sequence::{make_sequence, Length, Sequence};

// Re-exports - Cache
pub use cache::{CachePolicy, CacheStats, DEFAULT_MEMO_BATCH, MAX_MEMO_BATCH};

// Re-exports - Config
pub use builder::SequenceBuilder;
pub use config::{MemoOption, SequenceOptions};

// Re-exports - Errors
pub use error::{Result, SequenceError};

// Re-exports - Concurrency
pub use sync::SharedMemo;
