//! Fetch Cache - in-memory TTL caching with FIFO eviction
//!
//! Provides a capacity-bounded TTL cache store, fetch bindings that couple
//! a store to a `(key, fetcher)` pair, and a process-wide shared cache
//! with a periodic background sweep.

pub mod binding;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod shared;
pub mod tasks;

pub use binding::{BindingState, BoxFetchFuture, FetchBinding, Fetcher};
pub use cache::{CacheEntry, CacheStats, CacheStore, SharedStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use shared::SharedCache;
pub use tasks::spawn_sweep_task;
