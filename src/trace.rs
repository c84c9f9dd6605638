//! Workload traces for exercising and comparing cache engines.
//!
//! A trace is a replayable sequence of [`Request`]s — key plus an `i64`
//! value that doubles as the entry cost under
//! [`TraceSizer`](crate::traits::TraceSizer). The generators cover the
//! standard shapes used to characterize eviction policies:
//!
//! | Generator | Shape |
//! |-----------|-------|
//! | [`TraceGen::same_key_trace`] | one key repeated (pure temporal locality) |
//! | [`TraceGen::cycle_trace`] | `0..k` cycled (the LRU-killer loop) |
//! | [`TraceGen::normal_distribution`] | clustered keys around a mean |
//! | [`TraceGen::poisson_distribution`] | discrete clustered keys |
//! | [`TraceGen::zipfian_distribution`] | heavy-tailed popularity |
//!
//! All random generators take an explicit seed and are deterministic for
//! a given seed, so tests can pin exact hit counts.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Poisson, Zipf};

/// One trace step: a key and its value/cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub key: String,
    pub value: i64,
}

impl Request {
    pub fn new(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A finite, restartable request sequence.
pub trait Trace {
    /// Next request, or `None` at the end of the trace.
    fn next(&mut self) -> Option<Request>;

    /// Rewinds the trace to the beginning.
    fn reset(&mut self);
}

/// In-memory trace over a fixed request vector.
#[derive(Debug, Default)]
pub struct FixedTrace {
    requests: Vec<Request>,
    idx: usize,
}

impl FixedTrace {
    pub fn new(requests: Vec<Request>) -> Self {
        Self { requests, idx: 0 }
    }

    /// Appends requests to the end of the trace.
    pub fn add(&mut self, requests: Vec<Request>) {
        self.requests.extend(requests);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// The key sequence, cloned — what a
    /// [`BeladyCache`](crate::policy::belady::BeladyCache) is built from.
    pub fn keys(&self) -> Vec<String> {
        self.requests.iter().map(|r| r.key.clone()).collect()
    }
}

impl Trace for FixedTrace {
    fn next(&mut self) -> Option<Request> {
        let request = self.requests.get(self.idx)?.clone();
        self.idx += 1;
        Some(request)
    }

    fn reset(&mut self) {
        self.idx = 0;
    }
}

/// Constructors for the stock workload shapes.
pub struct TraceGen;

impl TraceGen {
    /// `n` requests for the same key.
    pub fn same_key_trace(n: usize, key: &str, value: i64) -> Vec<Request> {
        (0..n).map(|_| Request::new(key, value)).collect()
    }

    /// `n` requests cycling through keys `0..k`.
    ///
    /// `k == n` yields all-unique keys; `k < n` loops, which is the
    /// classic worst case for pure LRU at capacities below `k`.
    pub fn cycle_trace(n: usize, k: usize, value: i64) -> Vec<Request> {
        (0..n)
            .map(|i| Request::new((i % k).to_string(), value))
            .collect()
    }

    /// `n` keys drawn from a normal distribution, rounded to integers.
    pub fn normal_distribution(
        seed: u64,
        n: usize,
        mean: f64,
        stddev: f64,
        value: i64,
    ) -> Vec<Request> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let dist = Normal::new(mean, stddev).expect("invalid normal distribution parameters");
        (0..n)
            .map(|_| {
                let key = dist.sample(&mut rng).round() as i64;
                Request::new(key.to_string(), value)
            })
            .collect()
    }

    /// `n` keys drawn from a Poisson distribution.
    pub fn poisson_distribution(seed: u64, n: usize, mean: f64, value: i64) -> Vec<Request> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let dist = Poisson::new(mean).expect("invalid poisson mean");
        (0..n)
            .map(|_| {
                let key = dist.sample(&mut rng).round() as i64;
                Request::new(key.to_string(), value)
            })
            .collect()
    }

    /// `n` keys drawn Zipfian over `1..=k` with exponent `alpha`.
    pub fn zipfian_distribution(
        seed: u64,
        n: usize,
        k: usize,
        alpha: f64,
        value: i64,
    ) -> Vec<Request> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let dist = Zipf::new(k as f64, alpha).expect("invalid zipfian parameters");
        (0..n)
            .map(|_| {
                let key = dist.sample(&mut rng).round() as i64;
                Request::new(key.to_string(), value)
            })
            .collect()
    }
}
