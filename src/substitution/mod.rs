//! Replacement character selection and memoization

pub mod cache;
pub mod pool;

pub use cache::{CacheStats, Replacement, ReplacementCache, SharedReplacementCache, SubstitutionKey, KEY_EPSILON};
pub use pool::{CharClass, FontPools, PoolRegistry, SubstitutionPool};
