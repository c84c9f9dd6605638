//! Tiered dispatcher: route entries to inner caches by value cost.
//!
//! A `TieredCache` owns an ordered sequence of `(bound, cache)` pairs with
//! strictly increasing bounds. A write is routed to the first tier whose
//! bound covers the value's cost, so each inner cache only ever competes
//! among values of a similar size — a large value cannot wash out a tier
//! full of small ones. Values oversize for every tier are dropped.
//!
//! Reads scan the tiers in order and return the first hit; entries never
//! migrate between tiers. Statistics are the field-wise merge of the inner
//! engines' records.
//!
//! The dispatcher is generic over the [`Cache`] trait, so tiers can be
//! ARC engines, FlexARC engines, plain sized LRUs, or a mix.

use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::stats::Stats;
use crate::traits::{Cache, ElementCount, Sizer};

/// Cost-routed collection of inner caches.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arckit::policy::arc::AdaptiveCache;
/// use arckit::policy::tiered::TieredCache;
/// use arckit::traits::StringSizer;
///
/// type Tier = AdaptiveCache<u64, String, StringSizer>;
///
/// let mut cache: TieredCache<u64, String, Tier, StringSizer> = TieredCache::new();
/// cache.add_cache(16, AdaptiveCache::with_sizer(64, 0, StringSizer)).unwrap();
/// cache.add_cache(256, AdaptiveCache::with_sizer(1024, 0, StringSizer)).unwrap();
///
/// cache.insert(1, Arc::new("tiny".into()));            // first tier
/// cache.insert(2, Arc::new("x".repeat(100)));          // second tier
/// cache.insert(3, Arc::new("x".repeat(10_000)));       // oversize: dropped
///
/// assert!(cache.get(&1).is_some());
/// assert!(cache.get(&2).is_some());
/// assert!(cache.get(&3).is_none());
/// assert_eq!(cache.max_size(), 64 + 1024);
/// ```
#[derive(Debug)]
pub struct TieredCache<K, V, C, S = ElementCount>
where
    C: Cache<K, V>,
{
    bounds: Vec<usize>,
    tiers: Vec<C>,
    max_size: usize,
    sizer: S,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, C, S> TieredCache<K, V, C, S>
where
    C: Cache<K, V>,
    S: Sizer<V>,
{
    /// Creates an empty dispatcher.
    pub fn new() -> Self
    where
        S: Default,
    {
        Self::with_sizer(S::default())
    }

    /// Creates an empty dispatcher with an explicit sizer instance.
    pub fn with_sizer(sizer: S) -> Self {
        Self {
            bounds: Vec::new(),
            tiers: Vec::new(),
            max_size: 0,
            sizer,
            _marker: PhantomData,
        }
    }

    /// Appends a tier accepting values of cost up to `bound`.
    ///
    /// Bounds must be strictly increasing across calls.
    pub fn add_cache(&mut self, bound: usize, cache: C) -> Result<(), ConfigError> {
        if let Some(&last) = self.bounds.last() {
            if bound <= last {
                return Err(ConfigError::new(format!(
                    "tier bound {bound} must exceed the previous bound {last}"
                )));
            }
        }
        self.max_size += cache.max_size();
        self.bounds.push(bound);
        self.tiers.push(cache);
        Ok(())
    }

    /// Number of configured tiers.
    pub fn num_tiers(&self) -> usize {
        self.tiers.len()
    }

    /// Sum of the inner caches' capacities.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Sum of the inner caches' resident costs.
    pub fn size(&self) -> usize {
        self.tiers.iter().map(|c| c.size()).sum()
    }

    /// Sum of the inner caches' resident entry counts.
    pub fn num_entries(&self) -> usize {
        self.tiers.iter().map(|c| c.num_entries()).sum()
    }

    /// Sum of the inner engines' recency budgets.
    pub fn p(&self) -> usize {
        self.tiers.iter().map(|c| c.p()).sum()
    }

    /// Largest high-water mark among the inner engines.
    pub fn max_p(&self) -> usize {
        self.tiers.iter().map(|c| c.max_p()).max().unwrap_or(0)
    }

    /// Merged counter snapshot across all tiers.
    pub fn stats(&self) -> Stats {
        let mut merged = Stats::default();
        for tier in &self.tiers {
            merged.merge(&tier.stats());
        }
        merged
    }

    /// Scans the tiers in order and returns the first hit.
    ///
    /// The entry stays in whatever tier holds it.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        for tier in &mut self.tiers {
            if let Some(value) = tier.get(key) {
                return Some(value);
            }
        }
        None
    }

    /// Routes `value` to the first tier whose bound covers its cost.
    ///
    /// A value oversize for every tier is silently dropped.
    pub fn insert(&mut self, key: K, value: Arc<V>) {
        let cost = self.sizer.cost(&value);
        for (bound, tier) in self.bounds.iter().zip(&mut self.tiers) {
            if cost <= *bound {
                tier.insert(key, value);
                return;
            }
        }
        log::trace!("tiered insert dropped: cost {cost} exceeds every tier bound");
    }

    /// Clears every tier, statistics included.
    pub fn clear(&mut self) {
        for tier in &mut self.tiers {
            tier.clear();
        }
    }

    /// Empties every tier but preserves statistics.
    pub fn reset(&mut self) {
        for tier in &mut self.tiers {
            tier.reset();
        }
    }
}

impl<K, V, C, S> Default for TieredCache<K, V, C, S>
where
    C: Cache<K, V>,
    S: Sizer<V> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe dispatcher: one exclusive lock over the whole dispatch.
#[derive(Debug)]
pub struct ConcurrentTieredCache<K, V, C, S = ElementCount>
where
    C: Cache<K, V>,
{
    inner: Mutex<TieredCache<K, V, C, S>>,
}

impl<K, V, C, S> ConcurrentTieredCache<K, V, C, S>
where
    C: Cache<K, V>,
    S: Sizer<V>,
{
    /// Wraps an already-configured dispatcher.
    pub fn from_tiered(tiered: TieredCache<K, V, C, S>) -> Self {
        Self {
            inner: Mutex::new(tiered),
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().get(key)
    }

    pub fn insert(&self, key: K, value: Arc<V>) {
        self.inner.lock().insert(key, value);
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

    pub fn stats(&self) -> Stats {
        self.inner.lock().stats()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::arc::AdaptiveCache;
    use crate::policy::lru::SizedLru;
    use crate::traits::StringSizer;

    type Tier = AdaptiveCache<String, String, StringSizer>;

    fn tiered() -> TieredCache<String, String, Tier, StringSizer> {
        let mut cache = TieredCache::with_sizer(StringSizer);
        cache
            .add_cache(4, AdaptiveCache::with_sizer(16, 0, StringSizer))
            .unwrap();
        cache
            .add_cache(64, AdaptiveCache::with_sizer(256, 0, StringSizer))
            .unwrap();
        cache
    }

    #[test]
    fn routes_by_cost() {
        let mut cache = tiered();

        cache.insert("small".into(), Arc::new("abc".into()));
        cache.insert("large".into(), Arc::new("x".repeat(50)));

        assert_eq!(cache.num_entries(), 2);
        assert!(cache.get(&"small".to_string()).is_some());
        assert!(cache.get(&"large".to_string()).is_some());

        // The small value lives in tier 0, the large one in tier 1.
        assert_eq!(cache.tiers[0].num_entries(), 1);
        assert_eq!(cache.tiers[1].num_entries(), 1);
    }

    #[test]
    fn oversize_for_all_tiers_is_dropped() {
        let mut cache = tiered();
        cache.insert("huge".into(), Arc::new("x".repeat(1000)));
        assert_eq!(cache.num_entries(), 0);
        assert!(cache.get(&"huge".to_string()).is_none());
    }

    #[test]
    fn bounds_must_strictly_increase() {
        let mut cache = tiered();
        let err = cache
            .add_cache(64, AdaptiveCache::with_sizer(16, 0, StringSizer))
            .unwrap_err();
        assert!(err.to_string().contains("bound"));

        let err = cache
            .add_cache(32, AdaptiveCache::with_sizer(16, 0, StringSizer))
            .unwrap_err();
        assert!(err.to_string().contains("bound"));
    }

    #[test]
    fn max_size_sums_inner_capacities() {
        let cache = tiered();
        assert_eq!(cache.max_size(), 16 + 256);
    }

    #[test]
    fn stats_merge_across_tiers() {
        let mut cache = tiered();
        cache.insert("a".into(), Arc::new("ab".into()));
        cache.insert("b".into(), Arc::new("x".repeat(30)));

        cache.get(&"a".to_string());
        cache.get(&"b".to_string());
        cache.get(&"missing".to_string());

        let stats = cache.stats();
        assert_eq!(stats.num_hits, 2);
        // A scan records a miss in every tier it probes past: one from
        // tier 0 on the way to "b", two from the full missing-key scan.
        assert_eq!(stats.num_misses, 3);
    }

    #[test]
    fn clear_and_reset_forward_to_tiers() {
        let mut cache = tiered();
        cache.insert("a".into(), Arc::new("ab".into()));
        cache.get(&"a".to_string());

        cache.reset();
        assert_eq!(cache.num_entries(), 0);
        assert_eq!(cache.stats().num_hits, 1);

        cache.clear();
        assert_eq!(cache.stats(), Stats::default());
    }

    #[test]
    fn works_over_plain_lru_tiers() {
        let mut cache: TieredCache<String, String, SizedLru<String, String, StringSizer>, StringSizer> =
            TieredCache::with_sizer(StringSizer);
        cache.add_cache(8, SizedLru::with_sizer(32, StringSizer)).unwrap();
        cache.insert("k".into(), Arc::new("value".into()));
        assert!(cache.get(&"k".to_string()).is_some());
    }
}
