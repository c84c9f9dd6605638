//! Adaptive Replacement Cache (ARC) engine.
//!
//! ARC splits the resident budget between a recency list and a frequency
//! list and re-balances the split continuously from the workload itself,
//! using the history of what it recently evicted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     AdaptiveCache<K, V, S>                          │
//! │                                                                     │
//! │   resident (≤ max_size cost units)       history (keys only)       │
//! │                                                                     │
//! │   T1  recency  SizedLru ───evict──────►  B1  recency ghost          │
//! │    │ seen once, newest at head           │ capacity = max_size      │
//! │    │ re-access promotes to T2            │                          │
//! │   T2  frequency SizedLru ──evict──────►  B2  frequency ghost        │
//! │      seen at least twice                   capacity = max_size      │
//! │                                                                     │
//! │   p ∈ [0, max_size]: cost budget granted to T1                      │
//! │     hit in B1 → p grows   (workload wants recency)                  │
//! │     hit in B2 → p shrinks (workload wants frequency)                │
//! │                                                                     │
//! │   optional filter: keys seen exactly once, so a one-shot scan       │
//! │   cannot wash out the resident lists                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `replace` is the single-step eviction protocol: it demotes one resident
//! — from T1 when T1 is over its `p` budget, otherwise from T2 — into the
//! matching ghost list. `insert` dispatches on where the key currently
//! lives (resident, ghost, or nowhere) per the four cases of the ARC
//! paper, adapting `p` on the ghost cases, and finishes with a `fit` loop
//! that calls `replace` until the resident cost is back inside the budget.
//!
//! The sizer makes the same protocol work for entry-count or byte-cost
//! budgets; ghost lists always count entries.
//!
//! ## Inherited asymmetries, kept on purpose
//!
//! - In the fresh-insert case with `|T1| + |B1| == max_size` and T1 itself
//!   full, the engine evicts T1's tail directly and does not run
//!   `replace`; the sibling branch does. The distinction is observable in
//!   eviction counts at small capacities.
//! - A membership probe on a ghost promotes the probed key (Figure 4 of
//!   the paper treats probes as accesses).
//!
//! ## Thread safety
//!
//! [`AdaptiveCache`] is single-threaded. [`ConcurrentAdaptiveCache`] wraps
//! it in one exclusive lock covering every public operation, which is the
//! intended multi-thread configuration; the inner sub-caches then need no
//! locking of their own.
//!
//! ## References
//!
//! - Megiddo & Modha, "ARC: A Self-Tuning, Low Overhead Replacement
//!   Cache", FAST 2003

use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::ghost_list::GhostList;
use crate::error::ConfigError;
use crate::policy::lru::SizedLru;
use crate::stats::Stats;
use crate::traits::{Cache, ElementCount, Sizer};

/// Self-tuning cache balancing recency and frequency.
///
/// # Type Parameters
///
/// - `K`: key, `Eq + Hash + Clone`
/// - `V`: value, handed out as `Arc<V>`; handles stay valid after the key
///   is evicted
/// - `S`: cost policy, defaults to [`ElementCount`] (capacity = entries)
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arckit::policy::arc::AdaptiveCache;
///
/// let mut cache: AdaptiveCache<&str, i32> = AdaptiveCache::new(2);
///
/// cache.insert("a", Arc::new(1)); // enters the recency list
/// assert_eq!(cache.get(&"a").as_deref(), Some(&1)); // promoted to frequency
///
/// cache.insert("b", Arc::new(2));
/// cache.insert("c", Arc::new(3)); // "b" demoted to a ghost
///
/// assert_eq!(cache.size(), 2);
/// assert!(cache.get(&"b").is_none());
/// assert_eq!(cache.stats().num_misses, 1);
/// ```
#[derive(Debug)]
pub struct AdaptiveCache<K, V, S = ElementCount> {
    max_size: usize,
    p: usize,
    max_p: usize,
    /// T1: resident keys seen exactly once.
    lru: SizedLru<K, V, S>,
    /// T2: resident keys seen at least twice.
    lfu: SizedLru<K, V, S>,
    /// B1: keys recently demoted from T1.
    lru_ghost: GhostList<K>,
    /// B2: keys recently demoted from T2.
    lfu_ghost: GhostList<K>,
    /// Admission filter; capacity 0 disables it.
    filter: GhostList<K>,
    sizer: S,
    stats: Stats,
}

impl<K, V, S> AdaptiveCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V> + Clone,
{
    /// Creates an ARC cache with `max_size` cost units of resident budget.
    ///
    /// Ghost lists each track up to `max_size` evicted keys. No admission
    /// filter.
    ///
    /// # Panics
    ///
    /// Panics when `max_size` is zero; use [`try_new`](Self::try_new) for
    /// a fallible check.
    pub fn new(max_size: usize) -> Self
    where
        S: Default,
    {
        Self::with_filter(max_size, 0)
    }

    /// Creates an ARC cache with an admission filter of `filter_size`
    /// keys.
    ///
    /// A key absent from cache, ghosts, and filter is only remembered in
    /// the filter on first sight; it must be seen again before it is
    /// admitted to the resident lists. `filter_size` 0 disables the
    /// filter.
    pub fn with_filter(max_size: usize, filter_size: usize) -> Self
    where
        S: Default,
    {
        Self::with_sizer(max_size, filter_size, S::default())
    }

    /// Fallible constructor; rejects a zero `max_size`.
    pub fn try_new(max_size: usize) -> Result<Self, ConfigError>
    where
        S: Default,
    {
        if max_size == 0 {
            return Err(ConfigError::new("cache capacity must be > 0"));
        }
        Ok(Self::new(max_size))
    }

    /// Creates an ARC cache with an explicit sizer instance.
    pub fn with_sizer(max_size: usize, filter_size: usize, sizer: S) -> Self {
        assert!(max_size > 0, "cache capacity must be > 0");
        Self {
            max_size,
            p: 0,
            max_p: 0,
            lru: SizedLru::with_sizer(max_size, sizer.clone()),
            lfu: SizedLru::with_sizer(max_size, sizer.clone()),
            lru_ghost: GhostList::new(max_size),
            lfu_ghost: GhostList::new(max_size),
            filter: GhostList::new(filter_size),
            sizer,
            stats: Stats::default(),
        }
    }

    /// Configured resident capacity in cost units.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Current resident cost.
    pub fn size(&self) -> usize {
        self.lru.size() + self.lfu.size()
    }

    /// Number of resident entries.
    pub fn num_entries(&self) -> usize {
        self.lru.len() + self.lfu.len()
    }

    /// Current recency budget.
    pub fn p(&self) -> usize {
        self.p
    }

    /// High-water mark of `p` since the last clear.
    pub fn max_p(&self) -> usize {
        self.max_p
    }

    /// Admission filter capacity (0 when disabled).
    pub fn filter_size(&self) -> usize {
        self.filter.capacity()
    }

    /// Counter snapshot since the last [`clear`](Self::clear).
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Resident cost of the recency list (T1).
    pub fn lru_len(&self) -> usize {
        self.lru.size()
    }

    /// Resident cost of the frequency list (T2).
    pub fn lfu_len(&self) -> usize {
        self.lfu.size()
    }

    /// Keys tracked in the recency ghost (B1).
    pub fn lru_ghost_len(&self) -> usize {
        self.lru_ghost.len()
    }

    /// Keys tracked in the frequency ghost (B2).
    pub fn lfu_ghost_len(&self) -> usize {
        self.lfu_ghost.len()
    }

    /// Keys currently held by the admission filter.
    pub fn filter_len(&self) -> usize {
        self.filter.len()
    }

    /// Looks up `key`.
    ///
    /// A hit in T2 refreshes its position there; a hit in T1 promotes the
    /// entry to T2. A miss probes both ghost lists for observability (the
    /// probe itself refreshes the ghost entry) and leaves resident state
    /// untouched.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        if let Some(value) = self.lfu.get(key) {
            self.stats.num_hits += 1;
            self.stats.bytes_hit += self.sizer.cost(&value) as u64;
            self.stats.lfu_hits += 1;
            return Some(value);
        }

        if let Some(value) = self.lru.remove(key) {
            self.lfu.insert_no_evict(key.clone(), Arc::clone(&value));
            self.stats.num_hits += 1;
            self.stats.bytes_hit += self.sizer.cost(&value) as u64;
            self.stats.lru_hits += 1;
            return Some(value);
        }

        self.stats.num_misses += 1;
        let in_lru_ghost = self.lru_ghost.touch(key);
        let in_lfu_ghost = self.lfu_ghost.touch(key);
        self.stats.lru_ghost_hits += in_lru_ghost as u64;
        self.stats.lfu_ghost_hits += in_lfu_ghost as u64;
        debug_assert!(!(in_lru_ghost && in_lfu_ghost));
        None
    }

    /// Inserts `key`, using its eviction history to place it.
    ///
    /// Dispatch: resident keys are refreshed (a T1 resident moves to T2);
    /// ghost keys adapt `p`, make room via [`replace`](Self::replace), and
    /// re-enter at T2; unseen keys go to T1, after the filter has seen
    /// them twice when one is configured. Ends with the resident cost back
    /// inside `max_size`.
    pub fn insert(&mut self, key: K, value: Arc<V>) {
        // Case I-a: resident in T1 — second touch, promote to T2.
        if self.lru.remove(&key).is_some() {
            self.lfu.insert_no_evict(key, value);
            self.fit(false);
            debug_assert!(self.size() <= self.max_size);
            return;
        }

        // Case I-b: resident in T2 — refresh value and position.
        if self.lfu.peek(&key).is_some() {
            self.lfu.insert_no_evict(key, value);
            self.fit(true);
            debug_assert!(self.size() <= self.max_size);
            return;
        }

        let lru_ghost_hit = self.lru_ghost.touch(&key);
        let lfu_ghost_hit = self.lfu_ghost.touch(&key);

        // Keys with no history at all go through the double-hit filter
        // when one is configured; first sight is only remembered.
        if !(lru_ghost_hit || lfu_ghost_hit) && self.filter.capacity() > 0 {
            if !self.filter.touch(&key) {
                self.stats.arc_filter += 1;
                self.filter.record(key);
                return;
            }
            // Second sight: the key graduates from the filter into the
            // resident lists.
            self.filter.remove(&key);
        }

        if lru_ghost_hit {
            // Case II: recently evicted from T1 — the workload is more
            // recency-driven than p assumed.
            self.adapt_lru_ghost_hit();
            self.replace(false);
            self.lfu.insert_no_evict(key.clone(), value);
            self.lru_ghost.remove(&key);
            self.fit(false);
        } else if lfu_ghost_hit {
            // Case III: recently evicted from T2 — favor frequency.
            self.adapt_lfu_ghost_hit();
            self.replace(true);
            self.lfu.insert_no_evict(key.clone(), value);
            self.lfu_ghost.remove(&key);
            self.fit(true);
        } else {
            // Case IV: no history. Trim whichever side the bookkeeping
            // says is saturated, then admit into T1.
            let lru_total = self.lru.size() + self.lru_ghost.len();
            let total = self.lfu.size() + self.lfu_ghost.len() + lru_total;
            if lru_total == self.max_size {
                if self.lru.size() < self.max_size {
                    self.lru_ghost.evict_tail();
                    self.replace(false);
                } else if let Some((victim, cost)) = self.lru.evict_tail() {
                    // T1 occupies the whole budget: demote its tail
                    // directly, without consulting p.
                    self.lru_ghost.record(victim);
                    self.stats.lru_evicts += 1;
                    self.stats.num_evicted += 1;
                    self.stats.bytes_evicted += cost as u64;
                }
            } else if lru_total < self.max_size && total >= self.max_size {
                if total == 2 * self.max_size {
                    self.lfu_ghost.evict_tail();
                }
                self.replace(false);
            }
            if self.size() >= self.max_size {
                self.replace(false);
            }
            self.lru.insert_no_evict(key, value);
            self.fit(false);
        }
        debug_assert!(self.size() <= self.max_size);
    }

    /// Replaces the value of a resident key; `false` when not resident.
    ///
    /// A T1 resident moves to T2 (an update is a second access); a T2
    /// resident is updated in place. Ghost and filter state are untouched.
    pub fn update(&mut self, key: &K, value: Arc<V>) -> bool {
        if self.lru.remove(key).is_some() {
            self.lfu.insert_no_evict(key.clone(), value);
            self.fit(false);
            true
        } else if self.lfu.update(key, value) {
            self.fit(true);
            true
        } else {
            false
        }
    }

    /// Removes `key` everywhere: resident lists, ghosts, and history.
    ///
    /// A later insert of the same key is treated as completely fresh.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        if let Some(value) = self.lru.remove(key) {
            return Some(value);
        }
        if let Some(value) = self.lfu.remove(key) {
            return Some(value);
        }
        self.lru_ghost.remove(key);
        self.lfu_ghost.remove(key);
        None
    }

    /// Changes the resident capacity.
    ///
    /// Shrinking clamps `p` into the new range and evicts until the
    /// resident cost fits; growing only raises the bound. Ghost capacities
    /// stay as configured at construction.
    pub fn resize(&mut self, new_max: usize) {
        assert!(new_max > 0, "cache capacity must be > 0");
        if new_max < self.max_size {
            if self.p > new_max {
                // Everything the budget loses comes out of the recency
                // share; the frequency side keeps its entries.
                self.p = new_max;
            }
            self.max_size = new_max;
            self.fit(false);
        } else {
            self.max_size = new_max;
        }
        log::trace!("arc resize: max_size={} p={}", self.max_size, self.p);
    }

    /// Empties the cache and history but keeps statistics.
    pub fn reset(&mut self) {
        self.lru.reset();
        self.lfu.reset();
        self.lru_ghost.clear();
        self.lfu_ghost.clear();
        self.filter.clear();
        self.p = 0;
    }

    /// Empties the cache and history and zeroes statistics.
    pub fn clear(&mut self) {
        self.stats.clear();
        self.reset();
    }

    fn adapt_lru_ghost_hit(&mut self) {
        let delta = if self.lru_ghost.len() >= self.lfu_ghost.len() {
            1
        } else {
            self.lfu_ghost.len() / self.lru_ghost.len()
        };
        self.p = (self.p + delta).min(self.max_size);
        self.max_p = self.max_p.max(self.p);
        log::trace!("arc adapt: recency ghost hit, p={}", self.p);
    }

    fn adapt_lfu_ghost_hit(&mut self) {
        let delta = if self.lfu_ghost.len() >= self.lru_ghost.len() {
            1
        } else {
            self.lru_ghost.len() / self.lfu_ghost.len()
        };
        self.p = self.p.saturating_sub(delta);
        log::trace!("arc adapt: frequency ghost hit, p={}", self.p);
    }

    /// Demotes one resident into its ghost list.
    ///
    /// T1 gives up its tail when it holds more than `p` cost (or exactly
    /// `p` on a frequency-ghost hit); otherwise T2 does. When T2 is empty
    /// and T1 fills the whole budget, T1 is evicted regardless of `p`.
    /// Returns whether anything was evicted.
    fn replace(&mut self, in_lfu_ghost: bool) -> bool {
        let lru_size = self.lru.size();
        if lru_size > 0 && (lru_size > self.p || (lru_size == self.p && in_lfu_ghost)) {
            if let Some((victim, cost)) = self.lru.evict_tail() {
                self.lru_ghost.record(victim);
                self.stats.lru_evicts += 1;
                self.stats.num_evicted += 1;
                self.stats.bytes_evicted += cost as u64;
                return true;
            }
        } else if self.lfu.size() > 0 {
            if let Some((victim, cost)) = self.lfu.evict_tail() {
                self.lfu_ghost.record(victim);
                self.stats.lfu_evicts += 1;
                self.stats.num_evicted += 1;
                self.stats.bytes_evicted += cost as u64;
                return true;
            }
        } else if self.lru.size() >= self.max_size {
            // p shields T1 but T2 has nothing to give: evict T1 anyway.
            if let Some((victim, cost)) = self.lru.evict_tail() {
                self.lru_ghost.record(victim);
                self.stats.lru_evicts += 1;
                self.stats.num_evicted += 1;
                self.stats.bytes_evicted += cost as u64;
                return true;
            }
        }
        false
    }

    /// Runs `replace` until the resident cost fits the budget.
    fn fit(&mut self, in_lfu_ghost: bool) {
        while self.size() > self.max_size {
            if !self.replace(in_lfu_ghost) {
                break;
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Panics if any engine invariant is violated.
    pub fn debug_validate_invariants(&self) {
        assert!(self.size() <= self.max_size, "resident cost over budget");
        assert!(self.p <= self.max_size, "p out of range");
        assert!(self.lru_ghost.len() <= self.lru_ghost.capacity());
        assert!(self.lfu_ghost.len() <= self.lfu_ghost.capacity());

        self.lru.debug_validate_invariants();
        self.lfu.debug_validate_invariants();
        self.lru_ghost.debug_validate_invariants();
        self.lfu_ghost.debug_validate_invariants();
        self.filter.debug_validate_invariants();

        // Pairwise-disjoint key sets across residents, ghosts, filter.
        let mut seen = std::collections::HashSet::new();
        for key in self
            .lru
            .debug_snapshot_keys()
            .into_iter()
            .chain(self.lfu.debug_snapshot_keys())
            .chain(self.lru_ghost.debug_snapshot_keys())
            .chain(self.lfu_ghost.debug_snapshot_keys())
            .chain(self.filter.debug_snapshot_keys())
        {
            assert!(seen.insert(key), "key present in more than one list");
        }
    }
}

impl<K, V, S> Cache<K, V> for AdaptiveCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V> + Clone,
{
    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        AdaptiveCache::get(self, key)
    }

    fn insert(&mut self, key: K, value: Arc<V>) {
        AdaptiveCache::insert(self, key, value);
    }

    fn update(&mut self, key: &K, value: Arc<V>) -> bool {
        AdaptiveCache::update(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        AdaptiveCache::remove(self, key)
    }

    fn clear(&mut self) {
        AdaptiveCache::clear(self);
    }

    fn reset(&mut self) {
        AdaptiveCache::reset(self);
    }

    fn size(&self) -> usize {
        AdaptiveCache::size(self)
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn num_entries(&self) -> usize {
        AdaptiveCache::num_entries(self)
    }

    fn stats(&self) -> Stats {
        self.stats
    }

    fn p(&self) -> usize {
        self.p
    }

    fn max_p(&self) -> usize {
        self.max_p
    }

    fn filter_size(&self) -> usize {
        self.filter.capacity()
    }
}

/// Thread-safe ARC: one exclusive lock over every public operation.
///
/// The lock is not reentrant; operations never call back into user code
/// while holding it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arckit::policy::arc::ConcurrentAdaptiveCache;
///
/// let cache: Arc<ConcurrentAdaptiveCache<u64, u64>> =
///     Arc::new(ConcurrentAdaptiveCache::new(100));
///
/// let writer = Arc::clone(&cache);
/// std::thread::spawn(move || {
///     writer.insert(1, Arc::new(10));
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(cache.get(&1).as_deref(), Some(&10));
/// ```
#[derive(Debug)]
pub struct ConcurrentAdaptiveCache<K, V, S = ElementCount> {
    inner: Mutex<AdaptiveCache<K, V, S>>,
}

impl<K, V, S> ConcurrentAdaptiveCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V> + Clone,
{
    /// See [`AdaptiveCache::new`].
    pub fn new(max_size: usize) -> Self
    where
        S: Default,
    {
        Self {
            inner: Mutex::new(AdaptiveCache::new(max_size)),
        }
    }

    /// See [`AdaptiveCache::with_filter`].
    pub fn with_filter(max_size: usize, filter_size: usize) -> Self
    where
        S: Default,
    {
        Self {
            inner: Mutex::new(AdaptiveCache::with_filter(max_size, filter_size)),
        }
    }

    /// See [`AdaptiveCache::with_sizer`].
    pub fn with_sizer(max_size: usize, filter_size: usize, sizer: S) -> Self {
        Self {
            inner: Mutex::new(AdaptiveCache::with_sizer(max_size, filter_size, sizer)),
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().get(key)
    }

    pub fn insert(&self, key: K, value: Arc<V>) {
        self.inner.lock().insert(key, value);
    }

    pub fn update(&self, key: &K, value: Arc<V>) -> bool {
        self.inner.lock().update(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().remove(key)
    }

    pub fn resize(&self, new_max: usize) {
        self.inner.lock().resize(new_max);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn max_size(&self) -> usize {
        self.inner.lock().max_size()
    }

    pub fn num_entries(&self) -> usize {
        self.inner.lock().num_entries()
    }

    pub fn p(&self) -> usize {
        self.inner.lock().p()
    }

    pub fn max_p(&self) -> usize {
        self.inner.lock().max_p()
    }

    pub fn filter_size(&self) -> usize {
        self.inner.lock().filter_size()
    }

    pub fn stats(&self) -> Stats {
        self.inner.lock().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StringSizer;

    fn arc(max: usize) -> AdaptiveCache<String, String> {
        AdaptiveCache::new(max)
    }

    fn key(s: &str) -> String {
        s.to_string()
    }

    fn val(s: &str) -> Arc<String> {
        Arc::new(s.to_string())
    }

    #[test]
    fn small_cache_round_trip() {
        let mut cache = arc(2);
        assert_eq!(cache.size(), 0);

        cache.insert(key("Baby Yoda"), val("Unknown Name"));
        assert_eq!(cache.size(), 1);

        // Re-insert replaces the value (and promotes to the frequency side).
        cache.insert(key("Baby Yoda"), val("Grogu"));
        assert_eq!(cache.size(), 1);
        assert_eq!(
            cache.get(&key("Baby Yoda")).as_deref().map(String::as_str),
            Some("Grogu")
        );

        cache.insert(key("The Mandalorian"), val("Din Djarin"));
        assert_eq!(cache.size(), 2);
        cache.insert(key("Bounty Hunter"), val("Boba Fett"));
        assert_eq!(cache.size(), 2);
        assert!(cache.get(&key("The Mandalorian")).is_none());

        let removed = cache.remove(&key("Baby Yoda")).unwrap();
        assert_eq!(*removed, "Grogu");
        assert_eq!(cache.size(), 1);
        assert!(cache.get(&key("Baby Yoda")).is_none());
        cache.debug_validate_invariants();
    }

    #[test]
    fn byte_sized_cache_accounts_costs() {
        let mut cache: AdaptiveCache<String, String, StringSizer> =
            AdaptiveCache::with_sizer(16, 0, StringSizer);

        cache.insert(key("K0"), val("Abcd"));
        assert_eq!(cache.size(), 4);
        cache.insert(key("K0"), val("Abcde"));
        assert_eq!(cache.size(), 5);

        // Oversize value: the fit loop evicts everything, itself included.
        cache.insert(key("K0"), val("012345678901234567"));
        assert_eq!(cache.size(), 0);

        cache.insert(key("K0"), val("0123"));
        cache.insert(key("K1"), val("01234"));
        cache.insert(key("K2"), val("012345"));
        assert_eq!(
            cache.get(&key("K1")).as_deref().map(String::as_str),
            Some("01234")
        );
        cache.insert(key("K3"), val("012"));
        assert_eq!(cache.size(), 12);
        cache.debug_validate_invariants();
    }

    #[test]
    fn fills_as_plain_lru_until_pressure() {
        let mut cache = arc(2);
        cache.insert(key("a"), val("1"));
        cache.insert(key("b"), val("2"));
        cache.insert(key("c"), val("3"));
        assert_eq!(cache.size(), 2);
        assert!(cache.get(&key("a")).is_none());
        assert_eq!(cache.lru_ghost_len(), 1);
    }

    #[test]
    fn get_promotes_to_frequency_list() {
        let mut cache = arc(10);
        cache.insert(key("k"), val("v"));
        assert_eq!(cache.lru_len(), 1);
        assert_eq!(cache.lfu_len(), 0);

        cache.get(&key("k"));
        assert_eq!(cache.lru_len(), 0);
        assert_eq!(cache.lfu_len(), 1);

        // Stays in T2 on further accesses.
        cache.get(&key("k"));
        assert_eq!(cache.lfu_len(), 1);
        assert_eq!(cache.stats().lru_hits, 1);
        assert_eq!(cache.stats().lfu_hits, 1);
    }

    #[test]
    fn ghost_hit_readmits_into_frequency_list() {
        let mut cache = arc(2);
        cache.insert(key("a"), val("1"));
        cache.insert(key("b"), val("2"));
        cache.insert(key("c"), val("3")); // "a" demoted to B1
        assert_eq!(cache.lru_ghost_len(), 1);

        let p_before = cache.p();
        cache.insert(key("a"), val("1'"));
        assert!(cache.p() > p_before, "recency ghost hit must grow p");
        assert_eq!(cache.lfu_len(), 1);
        assert!(!cache.lru_ghost.contains(&key("a")));
        cache.debug_validate_invariants();
    }

    #[test]
    fn miss_probes_feed_ghost_counters() {
        let mut cache = arc(2);
        cache.insert(key("a"), val("1"));
        cache.insert(key("b"), val("2"));
        cache.insert(key("c"), val("3")); // "a" now in B1

        assert!(cache.get(&key("a")).is_none());
        assert_eq!(cache.stats().lru_ghost_hits, 1);
        assert_eq!(cache.stats().lfu_ghost_hits, 0);
    }

    #[test]
    fn update_moves_t1_resident_to_t2() {
        let mut cache = arc(4);
        cache.insert(key("a"), val("1"));
        assert!(cache.update(&key("a"), val("2")));
        assert_eq!(cache.lru_len(), 0);
        assert_eq!(cache.lfu_len(), 1);
        assert_eq!(
            cache.get(&key("a")).as_deref().map(String::as_str),
            Some("2")
        );
        assert!(!cache.update(&key("missing"), val("x")));
    }

    #[test]
    fn update_with_sizer_keeps_budget() {
        let mut cache: AdaptiveCache<String, String, StringSizer> =
            AdaptiveCache::with_sizer(8, 0, StringSizer);
        cache.insert(key("a"), val("aa"));
        cache.insert(key("b"), val("bb"));
        assert_eq!(cache.size(), 4);

        // Growing an entry past the budget evicts until it fits again.
        assert!(cache.update(&key("a"), val("aaaaaaa")));
        assert!(cache.size() <= 8);
        cache.debug_validate_invariants();
    }

    #[test]
    fn remove_erases_history_too() {
        let mut cache = arc(2);
        cache.insert(key("a"), val("1"));
        cache.insert(key("b"), val("2"));
        cache.insert(key("c"), val("3")); // "a" into B1
        assert!(cache.lru_ghost.contains(&key("a")));

        assert!(cache.remove(&key("a")).is_none());
        assert!(!cache.lru_ghost.contains(&key("a")));

        // Re-insert is fresh: lands in T1, no adaptation.
        let p_before = cache.p();
        cache.insert(key("a"), val("1"));
        assert_eq!(cache.p(), p_before);
        assert_eq!(cache.lru_len(), 2);
    }

    #[test]
    fn filter_absorbs_first_sight() {
        let mut cache: AdaptiveCache<String, String> = AdaptiveCache::with_filter(4, 4);

        cache.insert(key("scan"), val("1"));
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.filter_len(), 1);
        assert_eq!(cache.stats().arc_filter, 1);

        // Second sight is admitted.
        cache.insert(key("scan"), val("1"));
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.lru_len(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn resize_shrink_clamps_p_and_refits() {
        let mut cache = arc(4);
        for k in ["a", "b", "c", "d"] {
            cache.insert(key(k), val(k));
        }
        cache.insert(key("e"), val("e")); // "a" demoted
        cache.insert(key("a"), val("a")); // ghost hit: p > 0
        assert!(cache.p() > 0);

        cache.resize(2);
        assert!(cache.size() <= 2);
        assert!(cache.p() <= 2);
        cache.debug_validate_invariants();

        cache.resize(10);
        assert_eq!(cache.max_size(), 10);
    }

    #[test]
    fn clear_and_reset_differ_on_stats() {
        let mut cache = arc(2);
        cache.insert(key("a"), val("1"));
        cache.get(&key("a"));
        cache.get(&key("miss"));

        cache.reset();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.p(), 0);
        assert_eq!(cache.stats().num_hits, 1);
        assert_eq!(cache.stats().num_misses, 1);

        cache.clear();
        assert_eq!(cache.stats(), Stats::default());
    }

    #[test]
    fn capacity_one_cycles_through_ghost() {
        let mut cache = arc(1);
        cache.insert(key("a"), val("1"));
        cache.insert(key("b"), val("2"));
        assert_eq!(cache.size(), 1);
        assert!(cache.lru_ghost.contains(&key("a")));

        // The evicted key is reachable through the adaptation path.
        cache.insert(key("a"), val("1"));
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.lfu_len(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn zero_capacity_is_rejected() {
        let _cache: AdaptiveCache<String, String> = AdaptiveCache::new(0);
    }

    #[test]
    fn concurrent_wrapper_shares_across_threads() {
        let cache: Arc<ConcurrentAdaptiveCache<u64, u64>> =
            Arc::new(ConcurrentAdaptiveCache::new(64));

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..16u64 {
                        cache.insert(t * 16 + i, Arc::new(i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.num_entries(), 64);
        assert_eq!(cache.size(), 64);
    }

}
