//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and FIFO eviction.

mod entry;
mod order;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::{CacheStore, ExpireCallback, SharedStore};
