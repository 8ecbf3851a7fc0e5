//! Shared Process Cache Module
//!
//! A single long-lived store usable by any binding that wants a shared
//! rather than private cache, plus lifecycle control for the periodic
//! sweep. Constructed explicitly and passed through dependency injection;
//! there is no module-level singleton and no timer started as an import
//! side effect.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::binding::FetchBinding;
use crate::cache::{CacheStats, CacheStore, SharedStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

// == Shared Cache ==
/// A process-wide cache: one store, many bindings, one periodic sweep.
///
/// The sweep is the only place `cleanup()` runs automatically; it must be
/// started explicitly and can be stopped at any time, so ownership and
/// teardown stay with whoever composes the application. Dropping the
/// SharedCache aborts a still-running sweep.
pub struct SharedCache<V> {
    /// The shared store all bindings read and write
    store: SharedStore<V>,
    /// Interval between sweep runs
    sweep_interval: Duration,
    /// Handle of the running sweep task, if started
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V: Clone + Send + Sync + 'static> SharedCache<V> {
    // == Constructors ==
    /// Creates a shared cache from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_store(CacheStore::from_config(config), config.sweep_interval)
    }

    /// Creates a shared cache around an explicitly built store.
    ///
    /// Use this to install an `on_expire` callback or an injected clock
    /// before sharing the store.
    pub fn with_store(store: CacheStore<V>, sweep_interval: Duration) -> Self {
        Self {
            store: store.into_shared(),
            sweep_interval,
            sweeper: Mutex::new(None),
        }
    }

    /// The underlying shared store, for direct embedding or extra bindings.
    pub fn store(&self) -> SharedStore<V> {
        self.store.clone()
    }

    // == Sweep Lifecycle ==
    /// Starts the periodic sweep task.
    ///
    /// Errors with [`CacheError::SweepAlreadyRunning`] if the sweep is
    /// already running; the sweep is meant to be started exactly once for
    /// the life of the cache. Starting again after `stop()` is allowed.
    pub fn start(&self) -> Result<()> {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());

        if sweeper.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
            return Err(CacheError::SweepAlreadyRunning);
        }

        *sweeper = Some(spawn_sweep_task(self.store.clone(), self.sweep_interval));
        Ok(())
    }

    /// Stops the periodic sweep task.
    ///
    /// Returns true if a running sweep was aborted. Idempotent: stopping a
    /// never-started or already-stopped sweep returns false.
    pub fn stop(&self) -> bool {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());

        match sweeper.take() {
            Some(handle) => {
                handle.abort();
                info!("sweep task stopped");
                true
            }
            None => false,
        }
    }

    /// True while the sweep task is running.
    pub fn sweeping(&self) -> bool {
        let sweeper = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());
        sweeper.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    // == Bindings ==
    /// Creates a fetch binding over the shared store.
    ///
    /// Runs the binding's initial fetch before returning.
    pub async fn binding<F, Fut>(&self, key: impl Into<String>, fetcher: F) -> FetchBinding<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        FetchBinding::bind(self.store.clone(), key, fetcher).await
    }

    // == Administrative Operations ==
    /// Removes one key, for out-of-band invalidation when a write path is
    /// known to have made cached data stale.
    ///
    /// Returns whether the key was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    /// Removes everything from the shared store.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Current entry count, including logically expired but unswept entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Current cache counters.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

impl<V> Drop for SharedCache<V> {
    fn drop(&mut self) {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = sweeper.take() {
            handle.abort();
        }
    }
}
