//! Shared statistics record for all cache engines.
//!
//! Every engine owns one [`Stats`] and updates it while holding its lock.
//! The tiered dispatcher produces a merged snapshot of its inner engines.
//! Counters are cumulative since the last `clear`; `reset` on an engine
//! preserves them.
//!
//! ## Counter semantics
//!
//! | Counter | Incremented when |
//! |---------|------------------|
//! | `num_hits` / `num_misses` | every `get` resolves |
//! | `bytes_hit` | a `get` hit, by the value's cost under the engine sizer |
//! | `num_evicted` | `replace` (or a direct case-IV eviction) demotes a resident |
//! | `bytes_evicted` | same events, by the evicted entry's cached cost |
//! | `lru_hits` / `lfu_hits` | a hit lands in the recency / frequency list |
//! | `lru_evicts` / `lfu_evicts` | a demotion leaves the recency / frequency list |
//! | `lru_ghost_hits` / `lfu_ghost_hits` | a miss intersects the matching ghost |
//! | `arc_filter` | the admission filter absorbs a first-seen key |

/// Hit, miss, and eviction counters shared by every cache shape.
///
/// # Example
///
/// ```
/// use arckit::stats::Stats;
///
/// let mut total = Stats::default();
/// let shard = Stats { num_hits: 3, num_misses: 1, ..Stats::default() };
/// total.merge(&shard);
/// total.merge(&shard);
/// assert_eq!(total.num_hits, 6);
///
/// total.clear();
/// assert_eq!(total, Stats::default());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub num_hits: u64,
    pub num_misses: u64,
    pub num_evicted: u64,
    pub bytes_hit: u64,
    pub bytes_evicted: u64,
    pub lru_hits: u64,
    pub lfu_hits: u64,
    pub lru_evicts: u64,
    pub lfu_evicts: u64,
    pub lru_ghost_hits: u64,
    pub lfu_ghost_hits: u64,
    pub arc_filter: u64,
}

impl Stats {
    /// Zeroes every counter.
    pub fn clear(&mut self) {
        *self = Stats::default();
    }

    /// Adds `other` field-wise into `self`.
    pub fn merge(&mut self, other: &Stats) {
        self.num_hits += other.num_hits;
        self.num_misses += other.num_misses;
        self.num_evicted += other.num_evicted;
        self.bytes_hit += other.bytes_hit;
        self.bytes_evicted += other.bytes_evicted;
        self.lru_hits += other.lru_hits;
        self.lfu_hits += other.lfu_hits;
        self.lru_evicts += other.lru_evicts;
        self.lfu_evicts += other.lfu_evicts;
        self.lru_ghost_hits += other.lru_ghost_hits;
        self.lfu_ghost_hits += other.lfu_ghost_hits;
        self.arc_filter += other.arc_filter;
    }
}
