//! FlexARC: ARC with independently sized ghost lists.
//!
//! Classic ARC couples its eviction history to the resident capacity —
//! each ghost list remembers up to `max_size` keys. That coupling is a
//! policy choice, not a necessity: a small cache in front of a large key
//! space often wants a much longer memory than it has residency, and a
//! byte-budget cache may want a shorter one. `FlexArc` takes the ghost
//! capacity as its own knob.
//!
//! Decoupling the history changes the insert protocol in two ways,
//! mirrored from the reference implementation:
//!
//! - Case IV of the ARC ladder keys on `|T1| + |B1|` reaching capacity,
//!   which only makes sense when ghosts share the resident bound. Here the
//!   fresh-insert case looks at resident sizes alone.
//! - `replace` is a loop — "while the resident cost exceeds the budget,
//!   demote one entry" — rather than ARC's carefully placed single steps.
//!   It stops early if nothing is evictable, accepting a transient
//!   overflow of at most one oversize value.
//!
//! The admission filter is folded into the same case ladder; unlike ARC,
//! the filter short-circuit still ends with a `replace` pass.
//!
//! [`FlexArc`] is single-threaded; [`ConcurrentFlexArc`] provides the
//! one-lock-per-engine configuration.

use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::ghost_list::GhostList;
use crate::error::ConfigError;
use crate::policy::lru::SizedLru;
use crate::stats::Stats;
use crate::traits::{Cache, ElementCount, Sizer};

/// ARC variant whose ghost lists have their own capacity bound.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arckit::policy::flex_arc::FlexArc;
///
/// // 2 residents, but remember the last 4 evicted keys per list.
/// let mut cache: FlexArc<&str, i32> = FlexArc::new(2, 4);
/// cache.insert("a", Arc::new(1));
/// cache.insert("b", Arc::new(2));
/// cache.insert("c", Arc::new(3)); // "a" evicted, remembered in the ghost
///
/// assert!(cache.get(&"a").is_none());
/// assert_eq!(cache.stats().lru_ghost_hits, 1);
///
/// // Re-inserting the remembered key readmits it as a frequent key.
/// cache.insert("a", Arc::new(1));
/// assert!(cache.p() > 0);
/// ```
#[derive(Debug)]
pub struct FlexArc<K, V, S = ElementCount> {
    max_size: usize,
    ghost_size: usize,
    p: usize,
    max_p: usize,
    lru: SizedLru<K, V, S>,
    lfu: SizedLru<K, V, S>,
    lru_ghost: GhostList<K>,
    lfu_ghost: GhostList<K>,
    filter: GhostList<K>,
    sizer: S,
    stats: Stats,
}

impl<K, V, S> FlexArc<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V> + Clone,
{
    /// Creates a FlexARC with `max_size` resident cost units and ghost
    /// lists of `ghost_size` keys each.
    ///
    /// # Panics
    ///
    /// Panics when `max_size` is zero; [`try_new`](Self::try_new) reports
    /// the error instead.
    pub fn new(max_size: usize, ghost_size: usize) -> Self
    where
        S: Default,
    {
        Self::with_filter(max_size, ghost_size, 0)
    }

    /// Creates a FlexARC with an admission filter of `filter_size` keys.
    pub fn with_filter(max_size: usize, ghost_size: usize, filter_size: usize) -> Self
    where
        S: Default,
    {
        Self::with_sizer(max_size, ghost_size, filter_size, S::default())
    }

    /// Fallible constructor; rejects a zero `max_size`.
    pub fn try_new(max_size: usize, ghost_size: usize) -> Result<Self, ConfigError>
    where
        S: Default,
    {
        if max_size == 0 {
            return Err(ConfigError::new("cache capacity must be > 0"));
        }
        Ok(Self::new(max_size, ghost_size))
    }

    /// Creates a FlexARC with an explicit sizer instance.
    pub fn with_sizer(max_size: usize, ghost_size: usize, filter_size: usize, sizer: S) -> Self {
        assert!(max_size > 0, "cache capacity must be > 0");
        Self {
            max_size,
            ghost_size,
            p: 0,
            max_p: 0,
            lru: SizedLru::with_sizer(max_size, sizer.clone()),
            lfu: SizedLru::with_sizer(max_size, sizer.clone()),
            lru_ghost: GhostList::new(ghost_size),
            lfu_ghost: GhostList::new(ghost_size),
            filter: GhostList::new(filter_size),
            sizer,
            stats: Stats::default(),
        }
    }

    /// Configured resident capacity in cost units.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Configured per-list ghost capacity.
    pub fn ghost_size(&self) -> usize {
        self.ghost_size
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

    /// Resident cost of the recency list.
    pub fn lru_len(&self) -> usize {
        self.lru.size()
    }

    /// Resident cost of the frequency list.
    pub fn lfu_len(&self) -> usize {
        self.lfu.size()
    }

    /// Keys tracked in the recency ghost.
    pub fn lru_ghost_len(&self) -> usize {
        self.lru_ghost.len()
    }

    /// Keys tracked in the frequency ghost.
    pub fn lfu_ghost_len(&self) -> usize {
        self.lfu_ghost.len()
    }

    /// Looks up `key`; same promotion rules as ARC.
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

    /// Inserts `key` through the FlexARC case ladder.
    ///
    /// Every branch — the filter short-circuit included — finishes with a
    /// [`replace`](Self::replace) pass, so the resident budget holds on
    /// return (up to one oversize value when nothing is evictable).
    pub fn insert(&mut self, key: K, value: Arc<V>) {
        // Resident in T1: second touch, promote to T2.
        if self.lru.remove(&key).is_some() {
            self.lfu.insert_no_evict(key.clone(), value);
            debug_assert!(!self.lru_ghost.contains(&key) && !self.lfu_ghost.contains(&key));
            self.replace(false);
            return;
        }

        // Resident in T2: refresh value and position.
        if self.lfu.peek(&key).is_some() {
            self.lfu.insert_no_evict(key.clone(), value);
            debug_assert!(!self.lru_ghost.contains(&key) && !self.lfu_ghost.contains(&key));
            self.replace(false);
            return;
        }

        let lru_ghost_hit = self.lru_ghost.touch(&key);
        let lfu_ghost_hit = self.lfu_ghost.touch(&key);

        // Double-hit filter, folded into the ladder. Unlike ARC the
        // short-circuit still runs a replace pass.
        if !(lru_ghost_hit || lfu_ghost_hit) && self.filter.capacity() > 0 {
            if !self.filter.touch(&key) {
                self.stats.arc_filter += 1;
                self.filter.record(key);
                self.replace(false);
                return;
            }
            self.filter.remove(&key);
        }

        if lru_ghost_hit {
            // Recency ghost hit: grow p, readmit as frequent.
            self.adapt_lru_ghost_hit();
            self.lfu.insert_no_evict(key.clone(), value);
            self.lru_ghost.remove(&key);
            self.replace(false);
        } else if lfu_ghost_hit {
            // Frequency ghost hit: shrink p, readmit as frequent.
            self.adapt_lfu_ghost_hit();
            self.lfu.insert_no_evict(key.clone(), value);
            self.lfu_ghost.remove(&key);
            self.replace(true);
        } else {
            // Fresh key. Ghost occupancy is its own budget here, so the
            // dispatch looks at resident sizes only.
            let lru_size = self.lru.size();
            if lru_size == self.max_size {
                // The recency list owns the whole budget: age it out
                // until the incoming value fits.
                let vsize = self.sizer.cost(&value);
                while self.lru.size() + vsize > self.max_size {
                    match self.lru.evict_tail() {
                        Some((victim, cost)) => {
                            self.lru_ghost.record(victim);
                            self.stats.lru_evicts += 1;
                            self.stats.num_evicted += 1;
                            self.stats.bytes_evicted += cost as u64;
                        }
                        None => break,
                    }
                }
                self.lru.insert_no_evict(key, value);
            } else {
                self.lru.insert_no_evict(key, value);
                self.replace(false);
            }
        }
    }

    /// Replaces the value of a resident key; `false` when not resident.
    ///
    /// A T1 resident moves to T2; a T2 resident updates in place with
    /// proper cost adjustment, then the loop replace restores the budget.
    pub fn update(&mut self, key: &K, value: Arc<V>) -> bool {
        if self.lru.remove(key).is_some() {
            self.lfu.insert_no_evict(key.clone(), value);
            self.replace(false);
            true
        } else if self.lfu.update(key, value) {
            self.replace(false);
            true
        } else {
            false
        }
    }

    /// Removes `key` from resident lists and ghosts.
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

    /// Changes the resident capacity; ghost capacity is untouched.
    pub fn resize(&mut self, new_max: usize) {
        assert!(new_max > 0, "cache capacity must be > 0");
        if new_max < self.max_size {
            self.p = self.p.min(new_max);
            self.max_size = new_max;
            self.replace(false);
        } else {
            self.max_size = new_max;
        }
        log::trace!("flex-arc resize: max_size={} p={}", self.max_size, self.p);
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
        log::trace!("flex-arc adapt: recency ghost hit, p={}", self.p);
    }

    fn adapt_lfu_ghost_hit(&mut self) {
        let delta = if self.lfu_ghost.len() >= self.lru_ghost.len() {
            1
        } else {
            self.lru_ghost.len() / self.lfu_ghost.len()
        };
        self.p = self.p.saturating_sub(delta);
        log::trace!("flex-arc adapt: frequency ghost hit, p={}", self.p);
    }

    /// Loop eviction: demote entries until the resident cost fits.
    ///
    /// Same victim ordering as ARC's single-step replace. Stops when
    /// nothing can be evicted, leaving at most one oversize value as a
    /// transient overflow.
    fn replace(&mut self, in_lfu_ghost: bool) {
        while self.lru.size() + self.lfu.size() > self.max_size {
            let lru_size = self.lru.size();
            let evicted = if lru_size > 0
                && (lru_size > self.p || (lru_size == self.p && in_lfu_ghost))
            {
                self.evict_lru()
            } else if self.lfu.size() > 0 {
                self.evict_lfu()
            } else {
                // p shields an under-budget T1 and T2 is empty; something
                // still has to go.
                self.evict_lru()
            };
            if !evicted {
                break;
            }
        }
    }

    fn evict_lru(&mut self) -> bool {
        match self.lru.evict_tail() {
            Some((victim, cost)) => {
                debug_assert!(!self.lfu_ghost.contains(&victim));
                self.lru_ghost.record(victim);
                self.stats.lru_evicts += 1;
                self.stats.num_evicted += 1;
                self.stats.bytes_evicted += cost as u64;
                true
            }
            None => false,
        }
    }

    fn evict_lfu(&mut self) -> bool {
        match self.lfu.evict_tail() {
            Some((victim, cost)) => {
                debug_assert!(!self.lru_ghost.contains(&victim));
                self.lfu_ghost.record(victim);
                self.stats.lfu_evicts += 1;
                self.stats.num_evicted += 1;
                self.stats.bytes_evicted += cost as u64;
                true
            }
            None => false,
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Panics if any engine invariant is violated.
    pub fn debug_validate_invariants(&self) {
        assert!(self.size() <= self.max_size, "resident cost over budget");
        assert!(self.p <= self.max_size, "p out of range");
        assert!(self.lru_ghost.len() <= self.ghost_size);
        assert!(self.lfu_ghost.len() <= self.ghost_size);

        self.lru.debug_validate_invariants();
        self.lfu.debug_validate_invariants();
        self.lru_ghost.debug_validate_invariants();
        self.lfu_ghost.debug_validate_invariants();
        self.filter.debug_validate_invariants();

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

impl<K, V, S> Cache<K, V> for FlexArc<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V> + Clone,
{
    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        FlexArc::get(self, key)
    }

    fn insert(&mut self, key: K, value: Arc<V>) {
        FlexArc::insert(self, key, value);
    }

    fn update(&mut self, key: &K, value: Arc<V>) -> bool {
        FlexArc::update(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        FlexArc::remove(self, key)
    }

    fn clear(&mut self) {
        FlexArc::clear(self);
    }

    fn reset(&mut self) {
        FlexArc::reset(self);
    }

    fn size(&self) -> usize {
        FlexArc::size(self)
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn num_entries(&self) -> usize {
        FlexArc::num_entries(self)
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

/// Thread-safe FlexARC: one exclusive lock over every public operation.
#[derive(Debug)]
pub struct ConcurrentFlexArc<K, V, S = ElementCount> {
    inner: Mutex<FlexArc<K, V, S>>,
}

impl<K, V, S> ConcurrentFlexArc<K, V, S>
where
    K: Eq + Hash + Clone,
    S: Sizer<V> + Clone,
{
    /// See [`FlexArc::new`].
    pub fn new(max_size: usize, ghost_size: usize) -> Self
    where
        S: Default,
    {
        Self {
            inner: Mutex::new(FlexArc::new(max_size, ghost_size)),
        }
    }

    /// See [`FlexArc::with_filter`].
    pub fn with_filter(max_size: usize, ghost_size: usize, filter_size: usize) -> Self
    where
        S: Default,
    {
        Self {
            inner: Mutex::new(FlexArc::with_filter(max_size, ghost_size, filter_size)),
        }
    }

    /// See [`FlexArc::with_sizer`].
    pub fn with_sizer(max_size: usize, ghost_size: usize, filter_size: usize, sizer: S) -> Self {
        Self {
            inner: Mutex::new(FlexArc::with_sizer(max_size, ghost_size, filter_size, sizer)),
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

    pub fn ghost_size(&self) -> usize {
        self.inner.lock().ghost_size()
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
