//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with FIFO insertion-order
//! eviction and TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;

// == Type Aliases ==
/// Callback invoked with each evicted or expired key.
///
/// Never invoked for explicit `delete` or `clear` calls.
pub type ExpireCallback = Box<dyn FnMut(&str) + Send + Sync>;

/// A store behind a single mutual-exclusion boundary, shareable across tasks.
///
/// Every mutating path goes through the write lock, including the lazy
/// expiry performed by `get` and `has`.
pub type SharedStore<V> = Arc<RwLock<CacheStore<V>>>;

// == Cache Store ==
/// In-memory store with per-entry TTL and capacity-bounded FIFO eviction.
///
/// Eviction is by insertion time, not access recency: a read never
/// repositions an entry. `len() <= max_size` holds after every `set`.
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion-order tracker for FIFO eviction
    order: InsertionOrder,
    /// Activity counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL applied when `set` receives no explicit TTL
    default_ttl: Duration,
    /// Injected time source
    clock: Arc<dyn Clock>,
    /// Callback fired for evicted and expired keys
    on_expire: Option<ExpireCallback>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructors ==
    /// Creates a new CacheStore with the given capacity and default TTL,
    /// reading time from the system clock.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self::with_clock(max_size, default_ttl, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore with an injected time source.
    pub fn with_clock(max_size: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_size,
            default_ttl,
            clock,
            on_expire: None,
        }
    }

    /// Creates a new CacheStore from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_size, config.default_ttl)
    }

    /// Installs a callback fired with each evicted or expired key.
    pub fn on_expire(mut self, callback: impl FnMut(&str) + Send + Sync + 'static) -> Self {
        self.on_expire = Some(Box::new(callback));
        self
    }

    /// Wraps the store for shared use across tasks.
    pub fn into_shared(self) -> SharedStore<V> {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the whole entry is replaced: the value,
    /// the TTL, and the insertion time, which also moves the key to the
    /// back of the eviction order.
    ///
    /// If the store is at capacity and the key is new, exactly one entry is
    /// evicted: the earliest-inserted surviving key. The evicted key is
    /// reported through the `on_expire` callback.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>) {
        let is_replace = self.entries.contains_key(&key);

        if !is_replace && self.entries.len() >= self.max_size {
            if let Some(evicted) = self.order.pop_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "evicted to satisfy capacity bound");
                if let Some(callback) = self.on_expire.as_mut() {
                    callback(&evicted);
                }
            }
        }

        let entry = CacheEntry::new(
            value,
            self.clock.now_ms(),
            ttl.unwrap_or(self.default_ttl),
        );
        self.order.record(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An absent key is a miss. An entry whose TTL has elapsed is removed,
    /// `on_expire` fires once, and a miss is reported. A hit returns the
    /// value without resetting the insertion time or the eviction order.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }
            self.expire_entry(key);
        }

        self.stats.record_miss();
        None
    }

    // == Has ==
    /// Returns true iff `get` would hit.
    ///
    /// Runs the same lazy-expiry deletion path as `get`, so a `has`
    /// followed by a `get` is not atomic against interleaving mutation.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return true;
            }
            self.expire_entry(key);
        }

        false
    }

    // == Delete ==
    /// Removes an entry by key, reporting whether removal occurred.
    ///
    /// Explicit deletes are not expiry: `on_expire` does not fire.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            self.stats.set_total_entries(self.entries.len());
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry without firing `on_expire`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Cleanup ==
    /// Eagerly removes every expired entry, firing `on_expire` per key.
    ///
    /// Returns the number of entries removed. Reads already expire lazily,
    /// so this only bounds memory for keys that are written but never read.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.expire_entry(&key);
        }
        count
    }

    // == Keys ==
    /// Snapshot of keys in insertion order.
    ///
    /// Includes keys that are logically expired but not yet swept.
    pub fn keys(&self) -> Vec<String> {
        self.order.keys()
    }

    // == Length ==
    /// Current entry count, including logically expired but unswept entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The TTL applied when `set` receives no explicit TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Stats ==
    /// Returns current cache counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Expire Entry ==
    /// Removes a known-expired entry and fires `on_expire` exactly once.
    fn expire_entry(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.remove(key);
        self.stats.record_expiration();
        self.stats.set_total_entries(self.entries.len());
        debug!(key, "entry expired");
        if let Some(callback) = self.on_expire.as_mut() {
            callback(key);
        }
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("max_size", &self.max_size)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Mutex;

    fn store_with_clock(max_size: usize, ttl_ms: u64) -> (CacheStore<String>, ManualClock) {
        let clock = ManualClock::new();
        let store = CacheStore::with_clock(
            max_size,
            Duration::from_millis(ttl_ms),
            Arc::new(clock.clone()),
        );
        (store, clock)
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(100, Duration::from_secs(300));
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _clock) = store_with_clock(100, 300_000);

        store.set("key1".to_string(), "value1".to_string(), None);
        let value = store.get("key1");

        assert_eq!(value, Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _clock) = store_with_clock(100, 300_000);

        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_delete() {
        let (mut store, _clock) = store_with_clock(100, 300_000);

        store.set("key1".to_string(), "value1".to_string(), None);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let (mut store, _clock) = store_with_clock(100, 300_000);

        assert!(!store.delete("nonexistent"));
    }

    #[test]
    fn test_store_overwrite_replaces_entry() {
        let (mut store, clock) = store_with_clock(100, 300_000);

        store.set("key1".to_string(), "value1".to_string(), Some(Duration::from_millis(100)));
        clock.advance(80);

        // Re-set replaces the whole entry, restarting the TTL window
        store.set("key1".to_string(), "value2".to_string(), Some(Duration::from_millis(100)));
        clock.advance(80);

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_moves_to_back_of_eviction_order() {
        let (mut store, _clock) = store_with_clock(2, 300_000);

        store.set("a".to_string(), "1".to_string(), None);
        store.set("b".to_string(), "2".to_string(), None);

        // Re-setting "a" makes it the newest insertion, so "b" is evicted next
        store.set("a".to_string(), "1b".to_string(), None);
        store.set("c".to_string(), "3".to_string(), None);

        assert!(store.has("a"));
        assert!(!store.has("b"));
        assert!(store.has("c"));
    }

    #[test]
    fn test_store_ttl_expiration_fires_on_expire_once() {
        let expired: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let expired_keys = expired.clone();

        let clock = ManualClock::new();
        let mut store: CacheStore<String> =
            CacheStore::with_clock(100, Duration::from_millis(100), Arc::new(clock.clone()))
                .on_expire(move |key| expired_keys.lock().unwrap().push(key.to_string()));

        store.set("key1".to_string(), "value1".to_string(), None);

        clock.advance(101);
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.len(), 0);

        // A second read is a plain miss; the callback does not fire again
        assert_eq!(store.get("key1"), None);
        assert_eq!(expired.lock().unwrap().as_slice(), ["key1".to_string()]);
    }

    #[test]
    fn test_store_ttl_boundary_scenario() {
        // ttl = 100ms; hit at 50ms, miss at 110ms
        let (mut store, clock) = store_with_clock(100, 100);

        store.set("k".to_string(), "x".to_string(), None);

        clock.advance(50);
        assert_eq!(store.get("k"), Some("x".to_string()));

        clock.advance(60);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_store_zero_ttl_expires_on_next_read() {
        let (mut store, clock) = store_with_clock(100, 300_000);

        store.set("k".to_string(), "x".to_string(), Some(Duration::ZERO));
        clock.advance(1);

        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_store_hit_does_not_reset_insertion_time() {
        let (mut store, clock) = store_with_clock(100, 100);

        store.set("k".to_string(), "x".to_string(), None);

        clock.advance(60);
        assert_eq!(store.get("k"), Some("x".to_string()));

        // If the hit had reset inserted_at this would still be live
        clock.advance(60);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_store_fifo_eviction_scenario() {
        // max_size = 2; insert A, B, C in order
        let (mut store, _clock) = store_with_clock(2, 300_000);

        store.set("A".to_string(), "1".to_string(), None);
        store.set("B".to_string(), "2".to_string(), None);
        store.set("C".to_string(), "3".to_string(), None);

        assert_eq!(store.len(), 2);
        assert!(!store.has("A"));
        assert!(store.has("B"));
        assert!(store.has("C"));
    }

    #[test]
    fn test_store_eviction_ignores_access_recency() {
        let (mut store, _clock) = store_with_clock(2, 300_000);

        store.set("A".to_string(), "1".to_string(), None);
        store.set("B".to_string(), "2".to_string(), None);

        // Reading A does not protect it: eviction is FIFO, not LRU
        assert_eq!(store.get("A"), Some("1".to_string()));
        store.set("C".to_string(), "3".to_string(), None);

        assert!(!store.has("A"));
        assert!(store.has("B"));
        assert!(store.has("C"));
    }

    #[test]
    fn test_store_eviction_fires_on_expire() {
        let evicted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let evicted_keys = evicted.clone();

        let mut store: CacheStore<String> =
            CacheStore::new(1, Duration::from_secs(300))
                .on_expire(move |key| evicted_keys.lock().unwrap().push(key.to_string()));

        store.set("old".to_string(), "1".to_string(), None);
        store.set("new".to_string(), "2".to_string(), None);

        assert_eq!(evicted.lock().unwrap().as_slice(), ["old".to_string()]);
    }

    #[test]
    fn test_store_clear_fires_no_callbacks() {
        let calls = Arc::new(Mutex::new(0usize));
        let call_count = calls.clone();

        let mut store: CacheStore<String> =
            CacheStore::new(100, Duration::from_secs(300))
                .on_expire(move |_| *call_count.lock().unwrap() += 1);

        store.set("key1".to_string(), "value1".to_string(), None);
        store.set("key2".to_string(), "value2".to_string(), None);
        store.clear();

        assert_eq!(store.len(), 0);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_store_delete_fires_no_callbacks() {
        let calls = Arc::new(Mutex::new(0usize));
        let call_count = calls.clone();

        let mut store: CacheStore<String> =
            CacheStore::new(100, Duration::from_secs(300))
                .on_expire(move |_| *call_count.lock().unwrap() += 1);

        store.set("key1".to_string(), "value1".to_string(), None);
        store.delete("key1");

        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_store_cleanup_removes_exactly_expired_and_is_idempotent() {
        let expired: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let expired_keys = expired.clone();

        let clock = ManualClock::new();
        let mut store: CacheStore<String> =
            CacheStore::with_clock(100, Duration::from_secs(300), Arc::new(clock.clone()))
                .on_expire(move |key| expired_keys.lock().unwrap().push(key.to_string()));

        store.set("short".to_string(), "1".to_string(), Some(Duration::from_millis(100)));
        store.set("long".to_string(), "2".to_string(), Some(Duration::from_millis(10_000)));

        clock.advance(200);

        assert_eq!(store.cleanup(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.has("long"));
        assert_eq!(expired.lock().unwrap().as_slice(), ["short".to_string()]);

        // No time passed since the sweep: nothing further to remove
        assert_eq!(store.cleanup(), 0);
    }

    #[test]
    fn test_store_len_counts_unswept_expired_entries() {
        let (mut store, clock) = store_with_clock(100, 100);

        store.set("k".to_string(), "x".to_string(), None);
        clock.advance(200);

        // Expired but not yet observed by any read or sweep
        assert_eq!(store.len(), 1);

        store.cleanup();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_keys_in_insertion_order() {
        let (mut store, _clock) = store_with_clock(100, 300_000);

        store.set("b".to_string(), "1".to_string(), None);
        store.set("a".to_string(), "2".to_string(), None);
        store.set("c".to_string(), "3".to_string(), None);

        assert_eq!(store.keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_store_has_agrees_with_get() {
        let (mut store, clock) = store_with_clock(100, 100);

        store.set("k".to_string(), "x".to_string(), None);
        assert_eq!(store.has("k"), store.get("k").is_some());

        clock.advance(200);
        assert!(!store.has("k"));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_store_stats() {
        let (mut store, clock) = store_with_clock(1, 100);

        store.set("key1".to_string(), "value1".to_string(), None);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        store.set("key2".to_string(), "value2".to_string(), None); // evicts key1

        clock.advance(200);
        store.cleanup(); // expires key2

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
    }
}
