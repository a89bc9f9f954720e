//! Lazy sequences and their combinators.
//!
//! # Architecture
//!
//! - **Sequence**: restartable handle over a [`Source`](crate::generator::Source),
//!   with a length marker and a shared cache
//! - **Length**: `Finite(n)`, `AtMost(n)` or `Infinite`
//! - **Combinators**: lazy transforms returning new sequences, and strict
//!   reducers that consume a fresh cursor
//!
//! # Example
//!
//! ```
//! use sequence_engine::sources;
//!
//! let a = sources::from_vec(vec![1, 2, 3]);
//! let b = sources::from_vec(vec![10, 20]);
//!
//! let pairs = a.zip(&b, |x, y| x + y);
//! assert_eq!(pairs.to_vec().unwrap(), vec![11, 22]);
//! assert_eq!(pairs.count().unwrap(), 2);
//! ```

mod combinators;
mod lazy;

pub use lazy::{make_sequence, Length, Sequence};
