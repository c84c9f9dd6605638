//! Bounded key-only recency list for ghosts and the admission filter.
//!
//! The adaptive engines remember recently evicted keys without their
//! values: a hit on that history ("ghost hit") is the signal that drives
//! the recency/frequency balance. A `GhostList` is an [`AccessList`] of
//! keys plus a hash index, bounded to a fixed number of entries; every
//! entry costs exactly 1, so length doubles as size.
//!
//! Two details matter for the eviction protocol and are easy to miss:
//!
//! - [`touch`](GhostList::touch) promotes the probed key to the head.
//!   Probing IS an access in the ARC formulation, and which ghost key
//!   ages out next depends on it.
//! - [`record`](GhostList::record) evicts the tail when the list is at
//!   capacity, so a ghost insert can silently forget the oldest ghost.
//!
//! A capacity of 0 disables the list entirely; this is how an engine runs
//! without an admission filter.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::access_list::AccessList;
use crate::ds::slot_arena::SlotId;

/// Bounded recency list of keys, newest first.
///
/// # Example
///
/// ```
/// use arckit::ds::GhostList;
///
/// let mut ghost = GhostList::new(2);
/// ghost.record("a");
/// ghost.record("b");
///
/// // Probing promotes: "a" becomes the newest entry...
/// assert!(ghost.touch(&"a"));
///
/// // ...so recording a third key ages out "b", not "a".
/// ghost.record("c");
/// assert!(ghost.contains(&"a"));
/// assert!(!ghost.contains(&"b"));
/// ```
#[derive(Debug)]
pub struct GhostList<K> {
    list: AccessList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    ///
    /// Capacity 0 yields a disabled list that ignores all records.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: AccessList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Non-promoting membership check.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Promoting probe: if `key` is tracked, moves it to the head and
    /// returns `true`.
    ///
    /// This is the ghost-hit check the engines use on every miss.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => {
                self.list.move_to_front(id);
                true
            }
            None => false,
        }
    }

    /// Records `key` as the newest entry.
    ///
    /// A key already present is promoted. At capacity, the oldest key is
    /// dropped first. Disabled (capacity 0) lists ignore the call.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return;
        }

        if self.list.len() >= self.capacity {
            if let Some(old) = self.list.pop_back() {
                self.index.remove(&old);
            }
        }

        let id = self.list.push_front(key.clone());
        self.index.insert(key, id);
    }

    /// Removes `key`; returns `true` if it was tracked.
    ///
    /// Called after a ghost hit readmits the key to the resident lists.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            }
            None => false,
        }
    }

    /// Drops and returns the oldest tracked key.
    pub fn evict_tail(&mut self) -> Option<K> {
        let key = self.list.pop_back()?;
        self.index.remove(&key);
        Some(key)
    }

    /// Forgets every tracked key.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for &id in self.index.values() {
            assert!(self.list.contains(id));
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Keys from newest to oldest.
    pub fn debug_snapshot_keys(&self) -> Vec<K> {
        self.list.iter().cloned().collect()
    }
}
