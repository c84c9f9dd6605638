//! # Cache Trait Surface
//!
//! Two traits tie the library together:
//!
//! - [`Cache`]: the operation set shared by every engine shape (the sized
//!   LRU, the two adaptive engines, and anything a
//!   [`TieredCache`](crate::policy::tiered::TieredCache) can dispatch to).
//! - [`Sizer`]: the cost policy. The cost an entry reports at insert time
//!   is cached with the entry and is the cost subtracted when it is
//!   evicted, so mutable values whose size drifts in flight cannot corrupt
//!   the accounting.
//!
//! ## Trait Design
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │                Cache<K, V>                   │
//!   │                                              │
//!   │  get(&mut, &K)        → Option<Arc<V>>       │
//!   │  insert(&mut, K, Arc<V>)                     │
//!   │  update(&mut, &K, Arc<V>) → bool             │
//!   │  remove(&mut, &K)     → Option<Arc<V>>       │
//!   │  clear / reset                               │
//!   │  size / max_size / num_entries / stats       │
//!   │  p / max_p / filter_size  (default 0)        │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! Values move through the engines as `Arc<V>`: a handle returned from
//! `get` stays valid after the key is evicted or removed — eviction drops
//! only the cache's share. `p`, `max_p`, and `filter_size` default to 0 so
//! that non-adaptive caches (plain sized LRU, the oracle) can sit behind
//! the same trait the adaptive engines use.
//!
//! ## Stock sizers
//!
//! | Sizer | Cost of a value | Use |
//! |-------|-----------------|-----|
//! | [`ElementCount`] | always 1 | entry-count capacity |
//! | [`ValueSize`] | `size_of::<V>()` | fixed-size values |
//! | [`StringSizer`] | byte length | string payloads |
//! | [`TraceSizer`] | the `i64` value itself | workload replay, where the trace carries per-key costs |

use std::sync::Arc;

use crate::stats::Stats;

/// Cost policy: maps a value to a non-negative integer cost.
///
/// The engines call the sizer once per insert or update and cache the
/// result with the entry; evictions subtract the cached cost, never a
/// fresh sample.
///
/// # Example
///
/// ```
/// use arckit::traits::{ElementCount, Sizer, StringSizer};
///
/// assert_eq!(ElementCount.cost(&42u64), 1);
/// assert_eq!(StringSizer.cost(&"hello".to_string()), 5);
/// ```
pub trait Sizer<V> {
    /// Cost of `value` in the cache's budget units.
    fn cost(&self, value: &V) -> usize;
}

/// Counts every value as 1: capacity becomes an entry count.
///
/// This is the default sizer, and the one ghost and filter bookkeeping
/// always uses.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementCount;

impl<V> Sizer<V> for ElementCount {
    #[inline]
    fn cost(&self, _value: &V) -> usize {
        1
    }
}

/// Charges `size_of::<V>()` per value, for fixed-size payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueSize;

impl<V> Sizer<V> for ValueSize {
    #[inline]
    fn cost(&self, _value: &V) -> usize {
        std::mem::size_of::<V>()
    }
}

/// Charges the byte length of a string value.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringSizer;

impl Sizer<String> for StringSizer {
    #[inline]
    fn cost(&self, value: &String) -> usize {
        value.len()
    }
}

/// Treats the `i64` value itself as the cost.
///
/// Lets trace replays carry per-key sizes without materializing real
/// payloads. Negative values cost 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSizer;

impl Sizer<i64> for TraceSizer {
    #[inline]
    fn cost(&self, value: &i64) -> usize {
        if *value > 0 { *value as usize } else { 0 }
    }
}

/// Operations shared by every cache engine.
///
/// The contract on entry/exit states:
///
/// - after any of these operations returns, the engine's resident cost is
///   within its budget (`size() <= max_size()`);
/// - `get`, `update`, and `remove` of an absent key return the absent
///   sentinel and touch no resident state beyond the documented counters;
/// - `clear` zeroes statistics, `reset` preserves them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arckit::policy::lru::SizedLru;
/// use arckit::traits::Cache;
///
/// fn warm<C: Cache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.insert(*key, Arc::new(value.to_string()));
///     }
/// }
///
/// let mut cache: SizedLru<u64, String> = SizedLru::new(10);
/// warm(&mut cache, &[(1, "one"), (2, "two")]);
/// assert_eq!(cache.num_entries(), 2);
/// ```
pub trait Cache<K, V> {
    /// Looks up `key`, refreshing its position per the engine's policy.
    fn get(&mut self, key: &K) -> Option<Arc<V>>;

    /// Inserts or re-inserts `key`, evicting as the policy requires.
    fn insert(&mut self, key: K, value: Arc<V>);

    /// Replaces the value of a resident key in place; `false` when absent.
    fn update(&mut self, key: &K, value: Arc<V>) -> bool;

    /// Removes `key` from resident and history state, returning its value.
    fn remove(&mut self, key: &K) -> Option<Arc<V>>;

    /// Empties the cache and zeroes statistics.
    fn clear(&mut self);

    /// Empties the cache but preserves statistics.
    fn reset(&mut self);

    /// Current resident cost under the engine's sizer.
    fn size(&self) -> usize;

    /// Configured resident capacity in cost units.
    fn max_size(&self) -> usize;

    /// Number of resident entries (independent of the sizer).
    fn num_entries(&self) -> usize;

    /// Snapshot of the counters accumulated since the last `clear`.
    fn stats(&self) -> Stats;

    /// Current recency budget; 0 for non-adaptive caches.
    fn p(&self) -> usize {
        0
    }

    /// High-water mark of `p`; 0 for non-adaptive caches.
    fn max_p(&self) -> usize {
        0
    }

    /// Admission filter capacity; 0 when no filter is configured.
    fn filter_size(&self) -> usize {
        0
    }
}
