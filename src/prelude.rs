pub use crate::ds::{AccessList, GhostList, SlotArena, SlotId};
pub use crate::error::ConfigError;
pub use crate::policy::arc::{AdaptiveCache, ConcurrentAdaptiveCache};
pub use crate::policy::belady::BeladyCache;
pub use crate::policy::flex_arc::{ConcurrentFlexArc, FlexArc};
pub use crate::policy::lru::SizedLru;
pub use crate::policy::tiered::{ConcurrentTieredCache, TieredCache};
pub use crate::stats::Stats;
pub use crate::trace::{FixedTrace, Request, Trace, TraceGen};
pub use crate::traits::{Cache, ElementCount, Sizer, StringSizer, TraceSizer, ValueSize};
