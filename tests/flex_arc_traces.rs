// Trace-driven acceptance tests for FlexARC.
//
// The cycle battery pins the headline property of the independent ghost
// capacity: with history as long as the hot set, the post-scan pass is
// recognized wholesale, even at resident capacities where classic ARC has
// already lost one key to an early promotion.

use std::sync::Arc;

use arckit::policy::flex_arc::FlexArc;
use arckit::trace::{FixedTrace, Trace, TraceGen};

fn run_trace(cache: &mut FlexArc<String, i64>, trace: &mut FixedTrace) {
    while let Some(r) = trace.next() {
        if cache.get(&r.key).is_none() {
            cache.insert(r.key, Arc::new(r.value));
        }
    }
}

#[test]
fn single_key_hits_after_first_miss() {
    let mut cache = FlexArc::new(2, 2);
    let mut trace = FixedTrace::new(TraceGen::same_key_trace(100, "key", 4));
    run_trace(&mut cache, &mut trace);
    assert_eq!(cache.stats().num_hits, 99);
    assert_eq!(cache.stats().num_misses, 1);
}

#[test]
fn all_unique_keys_never_hit() {
    let mut cache = FlexArc::new(100, 100);
    let mut trace = FixedTrace::new(TraceGen::cycle_trace(100, 100, 4));
    run_trace(&mut cache, &mut trace);
    assert_eq!(cache.stats().num_hits, 0);
    assert_eq!(cache.stats().num_misses, 100);
}

#[test]
fn small_cycle_fits_entirely() {
    let mut cache = FlexArc::new(100, 100);
    let mut trace = FixedTrace::new(TraceGen::cycle_trace(100, 20, 4));
    run_trace(&mut cache, &mut trace);
    assert_eq!(cache.stats().num_hits, 80);
    assert_eq!(cache.stats().num_misses, 20);
}

#[test]
fn gaussian_working_set_mostly_hits() {
    let mut cache = FlexArc::new(100, 100);
    let mut trace = FixedTrace::new(TraceGen::normal_distribution(42, 500, 20.0, 5.0, 4));
    run_trace(&mut cache, &mut trace);
    assert!(cache.stats().num_hits > 400);
    assert!(cache.stats().num_misses < 100);

    let mut cache2 = FlexArc::new(100, 100);
    let mut trace2 = FixedTrace::new(TraceGen::normal_distribution(42, 500, 1000.0, 100.0, 4));
    run_trace(&mut cache2, &mut trace2);
    assert!(cache2.stats().num_hits > 50);
    assert!(cache2.stats().num_misses < 450);
}

#[test]
fn poisson_working_set_mostly_hits() {
    let mut cache = FlexArc::new(100, 100);
    let mut trace = FixedTrace::new(TraceGen::poisson_distribution(42, 500, 20.0, 4));
    run_trace(&mut cache, &mut trace);
    assert!(cache.stats().num_hits > 400);
    assert!(cache.stats().num_misses < 100);
}

#[test]
fn zipfian_hot_keys_dominate() {
    let mut cache = FlexArc::new(100, 100);
    let mut trace = FixedTrace::new(TraceGen::zipfian_distribution(42, 2000, 500, 1.0, 4));
    run_trace(&mut cache, &mut trace);
    assert!(cache.stats().num_hits > 1000);
    assert!(cache.stats().num_misses < 1000);
}

#[test]
fn cycle_battery_across_capacities() {
    let build = || {
        let mut trace = FixedTrace::new(TraceGen::cycle_trace(100, 20, 4));
        trace.add(TraceGen::cycle_trace(100, 20, 4));
        trace.add(TraceGen::cycle_trace(100, 20, 4));
        trace.add(TraceGen::cycle_trace(100, 100, 4));
        trace.add(TraceGen::cycle_trace(100, 20, 4));
        trace
    };

    let mut cache1 = FlexArc::new(100, 100);
    run_trace(&mut cache1, &mut build());
    assert_eq!(cache1.stats().num_hits, 400);
    assert_eq!(cache1.stats().num_misses, 100);

    let mut cache2 = FlexArc::new(40, 40);
    run_trace(&mut cache2, &mut build());
    assert_eq!(cache2.stats().num_hits, 400);
    assert_eq!(cache2.stats().num_misses, 100);

    // Classic ARC drops to 399 hits here; the loop-only replace keeps
    // the full hot set.
    let mut cache3 = FlexArc::new(20, 20);
    run_trace(&mut cache3, &mut build());
    assert_eq!(cache3.stats().num_hits, 400);
    assert_eq!(cache3.stats().num_misses, 100);

    let mut cache4 = FlexArc::new(10, 10);
    run_trace(&mut cache4, &mut build());
    assert_eq!(cache4.stats().num_hits, 5);
    assert_eq!(cache4.stats().num_misses, 495);
}

#[test]
fn long_ghost_memory_recognizes_a_returning_working_set() {
    // Resident capacity far below the hot set, but history covers it:
    // every miss on the second pass is a ghost hit.
    let mut cache = FlexArc::new(10, 100);
    let mut trace = FixedTrace::new(TraceGen::cycle_trace(50, 50, 4));
    run_trace(&mut cache, &mut trace);
    assert_eq!(cache.stats().num_misses, 50);
    assert_eq!(cache.stats().lru_ghost_hits, 0);

    let mut again = FixedTrace::new(TraceGen::cycle_trace(50, 50, 4));
    run_trace(&mut cache, &mut again);
    assert_eq!(cache.stats().lru_ghost_hits + cache.stats().lfu_ghost_hits, 50);
}

#[test]
fn hits_and_misses_account_for_every_get() {
    let mut cache = FlexArc::new(7, 21);
    let mut trace = FixedTrace::new(TraceGen::zipfian_distribution(7, 300, 40, 1.2, 4));
    let total = trace.len() as u64;
    run_trace(&mut cache, &mut trace);

    let stats = cache.stats();
    assert_eq!(stats.num_hits + stats.num_misses, total);
    assert!(stats.num_evicted >= stats.lru_evicts + stats.lfu_evicts);
}
