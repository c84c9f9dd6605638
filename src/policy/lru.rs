//! Sized LRU cache: the building block of the adaptive engines.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                        SizedLru<K, V, S>                           │
//! │                                                                    │
//! │   index: FxHashMap<K, entry>          order: AccessList<K>         │
//! │   ┌───────┬──────────────────────┐                                 │
//! │   │  Key  │ value, node, cost    │    head ─► [k2] ◄─► [k0] ◄─►    │
//! │   ├───────┼──────────────────────┤             MRU          [k1]   │
//! │   │  k0   │ Arc<V>, id_0, 4      │                           LRU   │
//! │   │  k1   │ Arc<V>, id_1, 7      │                            ▲    │
//! │   │  k2   │ Arc<V>, id_2, 1      │            evict_tail ─────┘    │
//! │   └───────┴──────────────────────┘                                 │
//! │                                                                    │
//! │   current_size = Σ cached cost   (12 here), bounded by max_size    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Capacity is measured in cost units reported by the [`Sizer`]: with the
//! default [`ElementCount`] the bound is an entry count, with a byte sizer
//! it is a byte budget. The cost is sampled once per insert/update and
//! cached with the entry; eviction subtracts the cached figure, so a value
//! whose size drifts while resident cannot unbalance the books.
//!
//! The adaptive engines drive this type through the
//! [`insert_no_evict`](SizedLru::insert_no_evict) /
//! [`evict_tail`](SizedLru::evict_tail) split: they place entries without
//! local eviction and run their own replacement protocol afterwards, which
//! means `current_size` may transiently exceed `max_size` between the two
//! steps. The plain [`insert`](SizedLru::insert) restores the bound itself
//! and is what standalone users want.
//!
//! One inherited quirk, kept deliberately: [`contains`](SizedLru::contains)
//! promotes the probed entry. The ARC paper's Figure 4 treats a membership
//! probe as an access, and the engines rely on that.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::access_list::AccessList;
use crate::ds::slot_arena::SlotId;
use crate::stats::Stats;
use crate::traits::{Cache, ElementCount, Sizer};

#[derive(Debug)]
struct SizedEntry<V> {
    value: Arc<V>,
    node: SlotId,
    cost: usize,
}

/// LRU cache with cost-based capacity accounting.
///
/// # Type Parameters
///
/// - `K`: key, `Eq + Hash + Clone` (keys are indexed and kept in the
///   recency list)
/// - `V`: value, handed out as `Arc<V>`
/// - `S`: cost policy, defaults to [`ElementCount`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arckit::policy::lru::SizedLru;
/// use arckit::traits::StringSizer;
///
/// // A 10-byte cache over string values.
/// let mut cache: SizedLru<&str, String, StringSizer> = SizedLru::new(10);
/// cache.insert("a", Arc::new("hello".into())); // cost 5
/// cache.insert("b", Arc::new("worlds".into())); // cost 6: "a" ages out
///
/// assert_eq!(cache.size(), 6);
/// assert!(cache.get(&"a").is_none());
/// assert_eq!(cache.get(&"b").as_deref().map(String::as_str), Some("worlds"));
/// ```
#[derive(Debug)]
pub struct SizedLru<K, V, S = ElementCount> {
    index: FxHashMap<K, SizedEntry<V>>,
    order: AccessList<K>,
    max_size: usize,
    current_size: usize,
    sizer: S,
    stats: Stats,
}

impl<K, V, S> SizedLru<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V>,
{
    /// Creates a cache bounded to `max_size` cost units.
    pub fn new(max_size: usize) -> Self
    where
        S: Default,
    {
        Self::with_sizer(max_size, S::default())
    }

    /// Creates a cache with an explicit sizer instance.
    pub fn with_sizer(max_size: usize, sizer: S) -> Self {
        Self {
            index: FxHashMap::default(),
            order: AccessList::new(),
            max_size,
            current_size: 0,
            sizer,
            stats: Stats::default(),
        }
    }

    /// Configured capacity in cost units.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Current cost sum.
    pub fn size(&self) -> usize {
        self.current_size
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot of this cache's own counters.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Looks up `key`, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        match self.index.get(key) {
            Some(entry) => {
                self.stats.num_hits += 1;
                self.stats.bytes_hit += entry.cost as u64;
                let value = Arc::clone(&entry.value);
                self.order.move_to_front(entry.node);
                Some(value)
            }
            None => {
                self.stats.num_misses += 1;
                None
            }
        }
    }

    /// Membership probe that promotes on a hit.
    ///
    /// A probe counts as an access here; this is what the ARC paper's
    /// Figure 4 specifies and what the adaptive engines depend on. Use
    /// [`peek`](Self::peek) to look without touching recency.
    pub fn contains(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(entry) => {
                self.order.move_to_front(entry.node);
                true
            }
            None => false,
        }
    }

    /// Reads the value for `key` without promoting or counting.
    pub fn peek(&self, key: &K) -> Option<&Arc<V>> {
        self.index.get(key).map(|entry| &entry.value)
    }

    /// Inserts or replaces `key` without any eviction.
    ///
    /// The new cost is sampled from the sizer; on replacement the old
    /// cached cost is released first. May push `size()` past `max_size()`
    /// — callers either run [`evict_tail`](Self::evict_tail) themselves
    /// (the engines) or should have used [`insert`](Self::insert).
    pub fn insert_no_evict(&mut self, key: K, value: Arc<V>) {
        let cost = self.sizer.cost(&value);
        match self.index.get_mut(&key) {
            Some(entry) => {
                self.order.move_to_front(entry.node);
                self.current_size -= entry.cost;
                entry.value = value;
                entry.cost = cost;
                self.current_size += cost;
            }
            None => {
                let node = self.order.push_front(key.clone());
                self.index.insert(key, SizedEntry { value, node, cost });
                self.current_size += cost;
            }
        }
    }

    /// Inserts `key`, then ages out tail entries until the budget holds.
    ///
    /// Returns the total cost evicted to make room.
    pub fn insert(&mut self, key: K, value: Arc<V>) -> usize {
        self.insert_no_evict(key, value);
        let before = self.current_size;
        while self.current_size > self.max_size {
            if self.evict_tail().is_none() {
                break;
            }
        }
        before - self.current_size
    }

    /// Replaces the value of a resident key, adjusting the cost sum and
    /// promoting it. Returns `false` when the key is absent.
    pub fn update(&mut self, key: &K, value: Arc<V>) -> bool {
        let cost = self.sizer.cost(&value);
        match self.index.get_mut(key) {
            Some(entry) => {
                self.order.move_to_front(entry.node);
                self.current_size -= entry.cost;
                entry.value = value;
                entry.cost = cost;
                self.current_size += cost;
                true
            }
            None => false,
        }
    }

    /// Removes `key`, returning its value handle.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let entry = self.index.remove(key)?;
        self.order.remove(entry.node);
        self.current_size -= entry.cost;
        Some(entry.value)
    }

    /// Ages out the least recently used entry.
    ///
    /// Returns the evicted key and its cached cost. Refuses to evict when
    /// the cost sum is zero — entries with zero cost occupy no budget and
    /// evicting them can never make room.
    pub fn evict_tail(&mut self) -> Option<(K, usize)> {
        if self.current_size == 0 {
            return None;
        }
        let key = self.order.pop_back()?;
        let entry = self
            .index
            .remove(&key)
            .expect("tail key missing from index");
        self.current_size -= entry.cost;
        self.stats.num_evicted += 1;
        self.stats.bytes_evicted += entry.cost as u64;
        Some((key, entry.cost))
    }

    /// Empties the cache but keeps statistics.
    pub fn reset(&mut self) {
        self.index.clear();
        self.order.clear();
        self.current_size = 0;
    }

    /// Empties the cache and zeroes statistics.
    pub fn clear(&mut self) {
        self.stats.clear();
        self.reset();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.index.len(), self.order.len());
        let total: usize = self.index.values().map(|entry| entry.cost).sum();
        assert_eq!(total, self.current_size);
        for entry in self.index.values() {
            assert!(self.order.contains(entry.node));
        }
        self.order.debug_validate_invariants();
    }

    #[cfg(any(test, debug_assertions))]
    /// Keys from most to least recently used.
    pub fn debug_snapshot_keys(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }
}

impl<K, V, S> Cache<K, V> for SizedLru<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V>,
{
    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        SizedLru::get(self, key)
    }

    fn insert(&mut self, key: K, value: Arc<V>) {
        SizedLru::insert(self, key, value);
    }

    fn update(&mut self, key: &K, value: Arc<V>) -> bool {
        SizedLru::update(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        SizedLru::remove(self, key)
    }

    fn clear(&mut self) {
        SizedLru::clear(self);
    }

    fn reset(&mut self) {
        SizedLru::reset(self);
    }

    fn size(&self) -> usize {
        self.current_size
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn num_entries(&self) -> usize {
        self.order.len()
    }

    fn stats(&self) -> Stats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StringSizer;

    fn lru(max: usize) -> SizedLru<String, i64> {
        SizedLru::new(max)
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut cache = lru(3);
        cache.insert("a".into(), Arc::new(1));
        assert_eq!(cache.get(&"a".into()).as_deref(), Some(&1));
        assert_eq!(cache.get(&"b".into()), None);
        assert_eq!(cache.stats().num_hits, 1);
        assert_eq!(cache.stats().num_misses, 1);
    }

    #[test]
    fn eviction_follows_recency_order() {
        let mut cache = lru(2);
        cache.insert("a".into(), Arc::new(1));
        cache.insert("b".into(), Arc::new(2));

        // Touch "a" so "b" becomes the tail.
        assert!(cache.contains(&"a".into()));

        cache.insert("c".into(), Arc::new(3));
        assert!(cache.peek(&"a".into()).is_some());
        assert!(cache.peek(&"b".into()).is_none());
        assert!(cache.peek(&"c".into()).is_some());
        assert_eq!(cache.stats().num_evicted, 1);
    }

    #[test]
    fn reinsert_replaces_value_and_promotes() {
        let mut cache = lru(2);
        cache.insert("a".into(), Arc::new(1));
        cache.insert("b".into(), Arc::new(2));
        cache.insert("a".into(), Arc::new(10));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.debug_snapshot_keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(cache.get(&"a".into()).as_deref(), Some(&10));
    }

    #[test]
    fn byte_sizer_accounts_costs() {
        let mut cache: SizedLru<&str, String, StringSizer> = SizedLru::new(10);
        cache.insert("a", Arc::new("abcd".into()));
        assert_eq!(cache.size(), 4);

        // Update adjusts the sum by the delta.
        assert!(cache.update(&"a", Arc::new("ab".into())));
        assert_eq!(cache.size(), 2);

        cache.insert("b", Arc::new("abcdefgh".into()));
        assert_eq!(cache.size(), 10);

        // One more byte forces the oldest out.
        cache.insert("c", Arc::new("x".into()));
        assert!(cache.peek(&"a").is_none());
        assert_eq!(cache.size(), 9);
        cache.debug_validate_invariants();
    }

    #[test]
    fn insert_reports_evicted_cost() {
        let mut cache: SizedLru<&str, String, StringSizer> = SizedLru::new(6);
        cache.insert("a", Arc::new("aaa".into()));
        cache.insert("b", Arc::new("bbb".into()));
        let evicted = cache.insert("c", Arc::new("cccc".into()));
        // Both residents had to go to fit the 4-byte value.
        assert_eq!(evicted, 6);
        assert_eq!(cache.size(), 4);
    }

    #[test]
    fn evict_tail_refuses_zero_cost_sum() {
        let mut cache: SizedLru<&str, String, StringSizer> = SizedLru::new(4);
        cache.insert("empty", Arc::new(String::new()));
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.len(), 1);
        assert!(cache.evict_tail().is_none());
    }

    #[test]
    fn remove_releases_cost() {
        let mut cache = lru(3);
        cache.insert("a".into(), Arc::new(1));
        cache.insert("b".into(), Arc::new(2));
        assert_eq!(cache.size(), 2);

        let removed = cache.remove(&"a".into());
        assert_eq!(removed.as_deref(), Some(&1));
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.remove(&"a".into()), None);
    }

    #[test]
    fn value_handles_survive_eviction() {
        let mut cache = lru(1);
        cache.insert("a".into(), Arc::new(7));
        let held = cache.get(&"a".into()).unwrap();
        cache.insert("b".into(), Arc::new(8));
        assert!(cache.peek(&"a".into()).is_none());
        assert_eq!(*held, 7);
    }

    #[test]
    fn clear_zeroes_stats_reset_keeps_them() {
        let mut cache = lru(2);
        cache.insert("a".into(), Arc::new(1));
        cache.get(&"a".into());
        cache.reset();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().num_hits, 1);

        cache.clear();
        assert_eq!(cache.stats(), Stats::default());
    }

    #[test]
    fn update_absent_key_is_false() {
        let mut cache = lru(2);
        assert!(!cache.update(&"nope".into(), Arc::new(0)));
    }
}
