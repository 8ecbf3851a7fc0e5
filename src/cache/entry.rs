//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

// == Cache Entry ==
/// A single stored value with its insertion time and time-to-live.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Clock reading (milliseconds) at insertion
    pub inserted_at: u64,
    /// Time-to-live for this entry
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry inserted at the given clock reading.
    pub fn new(value: V, inserted_at: u64, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given clock reading.
    ///
    /// Boundary condition: an entry is expired when strictly more than `ttl`
    /// has elapsed since insertion. A zero TTL is therefore expired by any
    /// later read once the clock has advanced at all.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.inserted_at) > self.ttl.as_millis() as u64
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at the given clock reading.
    ///
    /// Returns 0 once the TTL has elapsed. Useful for debugging and
    /// introspection; never consulted for expiry decisions.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        let expires_at = self.inserted_at + self.ttl.as_millis() as u64;
        expires_at.saturating_sub(now_ms)
    }
}
