//! Belady oracle: the clairvoyant eviction baseline.
//!
//! Knowing the entire access sequence up front, the optimal policy evicts
//! the resident key whose next access lies furthest in the future —
//! preferring keys that are never accessed again. No online policy can
//! beat it, which makes it the yardstick the adaptive engines are
//! measured against.
//!
//! The oracle is built from the key sequence of the exact trace that will
//! be replayed, and [`get`](BeladyCache::get) must then be called once per
//! trace position, in order. This is a benchmark instrument, not a
//! general-purpose cache: it has no eviction history, no adaptation, and
//! consuming accesses out of lockstep is a programmer error.
//!
//! Internals: a per-key list of access positions, a max-ordered map from
//! next-access position to key (the eviction queue), and a set of keys
//! with no accesses left (evicted first).

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::stats::Stats;

#[derive(Debug, Default)]
struct AccessHistory {
    /// Trace positions at which the key is accessed, in order.
    access_order: Vec<u64>,
    /// Index of the next unconsumed access.
    idx: usize,
}

/// Offline-optimal cache for trace replay.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arckit::policy::belady::BeladyCache;
///
/// let trace = ["a", "b", "a", "c"];
/// let mut oracle: BeladyCache<&str, i64> = BeladyCache::new(2, trace);
///
/// // Replay in lockstep: get, then insert on a miss.
/// for key in trace {
///     if oracle.get(&key).is_none() {
///         oracle.insert(key, Arc::new(0));
///     }
/// }
///
/// // Only the repeat access of "a" can hit, and it does.
/// assert_eq!(oracle.stats().num_hits, 1);
/// assert_eq!(oracle.stats().num_misses, 3);
/// ```
#[derive(Debug)]
pub struct BeladyCache<K, V> {
    max_size: usize,
    cache: FxHashMap<K, Arc<V>>,
    access_by_key: FxHashMap<K, AccessHistory>,
    /// Next-access position → key, for every resident with a future access.
    farthest_access: BTreeMap<u64, K>,
    /// Residents that will never be accessed again.
    unused: FxHashSet<K>,
    stats: Stats,
}

impl<K, V> BeladyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Builds the oracle for `max_size` entries over the given key
    /// sequence — the exact trace that will be replayed.
    pub fn new<I>(max_size: usize, trace_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        assert!(max_size > 0, "cache capacity must be > 0");
        let mut access_by_key: FxHashMap<K, AccessHistory> = FxHashMap::default();
        for (t, key) in trace_keys.into_iter().enumerate() {
            access_by_key
                .entry(key)
                .or_default()
                .access_order
                .push(t as u64);
        }
        Self {
            max_size,
            cache: FxHashMap::default(),
            access_by_key,
            farthest_access: BTreeMap::new(),
            unused: FxHashSet::default(),
            stats: Stats::default(),
        }
    }

    /// Configured capacity (entry count).
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of resident entries.
    pub fn size(&self) -> usize {
        self.cache.len()
    }

    /// Counter snapshot since the last [`clear`](Self::clear).
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Consumes the next access of `key` and returns its value if
    /// resident.
    ///
    /// # Panics
    ///
    /// Panics when `key` never appears in the indexed trace or its
    /// accesses are already used up — the replay has fallen out of
    /// lockstep with the trace the oracle was built from.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let history = self
            .access_by_key
            .get_mut(key)
            .expect("key not present in the indexed trace");
        assert!(
            history.idx < history.access_order.len(),
            "access replayed past the indexed trace"
        );
        let t = history.access_order[history.idx];
        history.idx += 1;

        let hit = self.cache.get(key).cloned();
        match hit {
            Some(value) => {
                self.stats.num_hits += 1;
                self.update_eviction_order(key, t);
                Some(value)
            }
            None => {
                self.stats.num_misses += 1;
                self.update_eviction_order(key, t);
                None
            }
        }
    }

    /// Makes `key` resident, evicting the optimal victim under pressure.
    pub fn insert(&mut self, key: K, value: Arc<V>) {
        if self.cache.len() >= self.max_size {
            self.stats.num_evicted += 1;
            self.evict();
        }
        debug_assert!(self.cache.len() < self.max_size);
        self.cache.insert(key.clone(), value);

        let history = self
            .access_by_key
            .get(&key)
            .expect("key not present in the indexed trace");
        match history.access_order.get(history.idx) {
            Some(&next) => {
                self.farthest_access.insert(next, key);
            }
            None => {
                self.unused.insert(key);
            }
        }
    }

    /// Rewinds to the start of the trace, keeping statistics.
    ///
    /// The replay and the trace must be rewound together.
    pub fn reset(&mut self) {
        self.farthest_access.clear();
        self.unused.clear();
        self.cache.clear();
        for history in self.access_by_key.values_mut() {
            history.idx = 0;
        }
    }

    /// Rewinds to the start of the trace and zeroes statistics.
    pub fn clear(&mut self) {
        self.reset();
        self.stats.clear();
    }

    fn evict(&mut self) {
        // Keys with no future access are free wins.
        if let Some(key) = self.unused.iter().next().cloned() {
            self.unused.remove(&key);
            self.cache.remove(&key);
            return;
        }

        // Otherwise drop the resident whose next access is furthest away.
        let (_, key) = self
            .farthest_access
            .pop_last()
            .expect("resident entries must be tracked for eviction");
        self.cache.remove(&key);
    }

    /// Consumes the position `t` from the eviction queue and requeues the
    /// key under its next access, if it is being tracked.
    fn update_eviction_order(&mut self, key: &K, t: u64) {
        if self.farthest_access.remove(&t).is_some() {
            let history = &self.access_by_key[key];
            match history.access_order.get(history.idx) {
                Some(&next) => {
                    self.farthest_access.insert(next, key.clone());
                }
                None => {
                    self.unused.insert(key.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(oracle: &mut BeladyCache<&str, i64>, trace: &[&'static str]) {
        for &key in trace {
            if oracle.get(&key).is_none() {
                oracle.insert(key, Arc::new(0));
            }
        }
    }

    #[test]
    fn keeps_the_key_needed_soonest() {
        // At the insert of "c", "a" is needed at t=3 and "b" only at t=4,
        // so "b" is the furthest-future resident and gets evicted.
        let trace = ["a", "b", "c", "a", "b"];
        let mut oracle: BeladyCache<&str, i64> = BeladyCache::new(2, trace);
        replay(&mut oracle, &trace);

        // Hits: "a" at t=3. "b" misses again at t=4 and re-enters.
        assert_eq!(oracle.stats().num_hits, 1);
        assert_eq!(oracle.stats().num_misses, 4);
        assert_eq!(oracle.stats().num_evicted, 2);
    }

    #[test]
    fn prefers_evicting_never_again_keys() {
        let trace = ["a", "b", "a", "c", "a"];
        let mut oracle: BeladyCache<&str, i64> = BeladyCache::new(2, trace);
        replay(&mut oracle, &trace);

        // "b" is never needed after t=1, so "a" survives both gaps.
        assert_eq!(oracle.stats().num_hits, 2);
        assert_eq!(oracle.stats().num_misses, 3);
    }

    #[test]
    fn reset_replays_identically() {
        let trace = ["x", "y", "x", "z", "x", "y"];
        let mut oracle: BeladyCache<&str, i64> = BeladyCache::new(2, trace);
        replay(&mut oracle, &trace);
        let first = oracle.stats();

        oracle.reset();
        replay(&mut oracle, &trace);
        let second = oracle.stats();

        assert_eq!(second.num_hits, 2 * first.num_hits);
        assert_eq!(second.num_misses, 2 * first.num_misses);

        oracle.clear();
        assert_eq!(oracle.stats(), Stats::default());
        assert_eq!(oracle.size(), 0);
    }

    #[test]
    #[should_panic(expected = "indexed trace")]
    fn out_of_lockstep_access_panics() {
        let mut oracle: BeladyCache<&str, i64> = BeladyCache::new(2, ["a"]);
        oracle.get(&"never-indexed");
    }
}
