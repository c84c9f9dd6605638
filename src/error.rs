//! Error types for the arckit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are
//!   invalid (zero capacity, out-of-order tier bounds).
//!
//! Absent-key outcomes (`get`/`update`/`remove` on a missing key,
//! `evict_tail` on an empty cache) are not errors; they are `Option`/`bool`
//! returns on the operations themselves.
//!
//! ## Example Usage
//!
//! ```
//! use arckit::error::ConfigError;
//! use arckit::policy::arc::AdaptiveCache;
//!
//! // Fallible constructor for user-supplied parameters
//! let cache: Result<AdaptiveCache<String, i64>, ConfigError> = AdaptiveCache::try_new(100);
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad = AdaptiveCache::<String, i64>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`AdaptiveCache::try_new`](crate::policy::arc::AdaptiveCache::try_new)
/// and by [`TieredCache::add_cache`](crate::policy::tiered::TieredCache::add_cache).
/// Carries a human-readable description of which parameter failed
/// validation.
///
/// # Example
///
/// ```
/// use arckit::policy::flex_arc::FlexArc;
///
/// let err = FlexArc::<u64, u64>::try_new(0, 10).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
