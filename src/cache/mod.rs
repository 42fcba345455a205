//! Two-tier result cache.
//!
//! Both tiers are keyed by [`CacheKey`] (normalized MPN, manufacturer,
//! site, language, currency). The [`EphemeralCache`] expires entries by
//! TTL; the [`ResultStore`] behind it keeps them until an explicit cleanup.

mod ephemeral;
mod key;
mod persistent;
mod tiered;

pub use ephemeral::EphemeralCache;
pub use key::{CacheKey, ANY_MANUFACTURER};
pub use persistent::{CacheEntry, CacheStats, FileResultStore, MemoryResultStore, ResultStore};
pub use tiered::{CacheTier, TwoTierCache};
