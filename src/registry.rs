//! Named default sequences.
//!
//! Expensive shared sequences (a memoized prime table, say) are created on
//! first use and handed out as cheap clones afterwards, so every caller
//! shares one cache. Entries are keyed by name *and* element type, and live
//! per thread because [`Sequence`] is single-threaded.
//!
//! Nothing is created at load time. Tests that need a clean slate call
//! [`clear`].
//!
//! ```
//! use sequence_engine::{registry, sources};
//!
//! let squares = registry::get_or_init("squares", || sources::naturals().map(|x| x * x).memoize());
//! assert_eq!(squares.get(3).unwrap(), 16);
//!
//! // Same cache, no second initialization.
//! let again = registry::get_or_init::<u64, _>("squares", || unreachable!());
//! assert_eq!(again.materialized(), squares.materialized());
//! ```

use crate::sequence::Sequence;
use ahash::AHashMap;
use std::any::{Any, TypeId};
use std::cell::RefCell;

type Key = (String, TypeId);

thread_local! {
    static REGISTRY: RefCell<AHashMap<Key, Box<dyn Any>>> = RefCell::new(AHashMap::new());
}

fn key<T: 'static>(name: &str) -> Key {
    (name.to_string(), TypeId::of::<Sequence<T>>())
}

fn lookup<T: Clone + 'static>(name: &str) -> Option<Sequence<T>> {
    REGISTRY.with(|registry| {
        registry
            .borrow()
            .get(&key::<T>(name))
            .and_then(|entry| entry.downcast_ref::<Sequence<T>>())
            .cloned()
    })
}

/// The sequence registered under `name`, created by `init` on first use.
///
/// `init` runs while the registry is not borrowed, so it may itself use the
/// registry. If it registers `name` in the meantime, that entry wins.
pub fn get_or_init<T, F>(name: &str, init: F) -> Sequence<T>
where
    T: Clone + 'static,
    F: FnOnce() -> Sequence<T>,
{
    if let Some(existing) = lookup::<T>(name) {
        return existing;
    }

    let created = init();
    log::debug!("registry: initialized '{}' ({:?})", name, created.length());

    REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let entry = registry
            .entry(key::<T>(name))
            .or_insert_with(|| Box::new(created) as Box<dyn Any>);
        match entry.downcast_ref::<Sequence<T>>() {
            Some(sequence) => sequence.clone(),
            None => unreachable!("registry key includes the element type"),
        }
    })
}

/// True if a `Sequence<T>` is registered under `name`.
pub fn contains<T: 'static>(name: &str) -> bool {
    REGISTRY.with(|registry| registry.borrow().contains_key(&key::<T>(name)))
}

/// Unregister a sequence. Existing clones keep working.
pub fn remove<T: Clone + 'static>(name: &str) -> Option<Sequence<T>> {
    REGISTRY.with(|registry| {
        registry
            .borrow_mut()
            .remove(&key::<T>(name))
            .and_then(|entry| entry.downcast::<Sequence<T>>().ok())
            .map(|sequence| *sequence)
    })
}

/// Number of registered sequences on this thread.
pub fn len() -> usize {
    REGISTRY.with(|registry| registry.borrow().len())
}

/// Unregister everything on this thread.
pub fn clear() {
    REGISTRY.with(|registry| registry.borrow_mut().clear());
}
