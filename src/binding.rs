//! Fetch Binding Module
//!
//! Couples one cache store to a `(key, fetcher)` pair and publishes the
//! familiar value/loading/error triple. A binding can sit on a private
//! store of its own or on a process-wide shared one.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStore, SharedStore};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Type Aliases ==
/// The boxed future a fetcher produces.
pub type BoxFetchFuture<V> = Pin<Box<dyn Future<Output = Result<V>> + Send>>;

/// A zero-argument operation that asynchronously produces a value or fails.
///
/// Must be safe to invoke multiple times concurrently for the same key:
/// overlapping `fetch` calls are not coalesced, each invokes the fetcher
/// independently and the last write wins.
pub type Fetcher<V> = Arc<dyn Fn() -> BoxFetchFuture<V> + Send + Sync>;

fn wrap_fetcher<V, F, Fut>(fetcher: F) -> Fetcher<V>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
{
    Arc::new(move || -> BoxFetchFuture<V> { Box::pin(fetcher()) })
}

// == Binding State ==
/// The state a binding publishes to its consumer.
#[derive(Debug, Clone)]
pub struct BindingState<V> {
    /// The last successfully fetched or cache-served value
    pub value: Option<V>,
    /// True while a fetch is in flight
    pub loading: bool,
    /// The last fetch failure; cleared when a new fetch starts
    pub error: Option<CacheError>,
}

impl<V> Default for BindingState<V> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
        }
    }
}

// == Fetch Binding ==
/// Binds a cache store to a `(key, fetcher)` pair.
///
/// Cloning a binding shares its store, fetcher and published state, so a
/// clone can be handed to another task for concurrent `fetch` calls.
#[derive(Clone)]
pub struct FetchBinding<V> {
    /// The cache key this binding reads and writes
    key: String,
    /// The bound store, private or shared
    store: SharedStore<V>,
    /// Producer invoked on cache miss or forced refresh
    fetcher: Fetcher<V>,
    /// Published value/loading/error state
    state: Arc<RwLock<BindingState<V>>>,
}

impl<V: Clone + Send + Sync + 'static> FetchBinding<V> {
    // == Constructors ==
    /// Binds `key` and `fetcher` to an existing store and runs the initial
    /// fetch before returning.
    pub async fn bind<F, Fut>(store: SharedStore<V>, key: impl Into<String>, fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let binding = Self {
            key: key.into(),
            store,
            fetcher: wrap_fetcher(fetcher),
            state: Arc::new(RwLock::new(BindingState::default())),
        };
        binding.fetch(false).await;
        binding
    }

    /// Binds `key` and `fetcher` to a fresh private store.
    ///
    /// Private stores are never swept; they rely solely on lazy expiry
    /// during reads. The store lives exactly as long as the binding (and
    /// its clones), so discarding the binding releases the entries.
    pub async fn private<F, Fut>(config: &Config, key: impl Into<String>, fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        Self::bind(CacheStore::from_config(config).into_shared(), key, fetcher).await
    }

    // == Fetch ==
    /// Publishes the cached value for `key`, or invokes the fetcher.
    ///
    /// Without `force_refresh`, a cache hit is published as-is and the
    /// fetcher is not invoked. On a miss or a forced refresh: `loading`
    /// becomes true and `error` clears; a successful fetch stores the
    /// result under `key` with the store's default TTL and publishes it; a
    /// failure publishes the error verbatim and leaves any previously
    /// published value unchanged. Failed fetches never populate the store,
    /// so the next call retries from scratch. `loading` is false once the
    /// fetch settles.
    ///
    /// Overlapping calls are not guarded: each invokes the fetcher and the
    /// last one to settle wins.
    pub async fn fetch(&self, force_refresh: bool) {
        if !force_refresh {
            // Lazy expiry makes get a write
            let cached = self.store.write().await.get(&self.key);
            if let Some(value) = cached {
                debug!(key = %self.key, "fetch served from cache");
                self.state.write().await.value = Some(value);
                return;
            }
        }

        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        match (self.fetcher)().await {
            Ok(value) => {
                self.store
                    .write()
                    .await
                    .set(self.key.clone(), value.clone(), None);
                let mut state = self.state.write().await;
                state.value = Some(value);
                state.loading = false;
                debug!(key = %self.key, "fetch stored and published");
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "fetch failed");
                let mut state = self.state.write().await;
                state.error = Some(err);
                state.loading = false;
            }
        }
    }

    // == Refresh ==
    /// Forces a re-fetch, bypassing the cache.
    pub async fn refresh(&self) {
        self.fetch(true).await;
    }

    // == Invalidate ==
    /// Deletes `key` from the bound store.
    ///
    /// Does not trigger a re-fetch and does not change published state.
    pub async fn invalidate(&self) -> bool {
        self.store.write().await.delete(&self.key)
    }

    // == Rebind ==
    /// Swaps the `(key, fetcher)` identity and re-runs the initial fetch.
    pub async fn rebind<F, Fut>(&mut self, key: impl Into<String>, fetcher: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.key = key.into();
        self.fetcher = wrap_fetcher(fetcher);
        self.fetch(false).await;
    }

    // == State Accessors ==
    /// Snapshot of the published state.
    pub async fn state(&self) -> BindingState<V> {
        self.state.read().await.clone()
    }

    /// The last published value, if any.
    pub async fn value(&self) -> Option<V> {
        self.state.read().await.value.clone()
    }

    /// True while a fetch is in flight.
    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// The last fetch failure, if any.
    pub async fn error(&self) -> Option<CacheError> {
        self.state.read().await.error.clone()
    }

    /// The bound key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The bound store.
    pub fn store(&self) -> SharedStore<V> {
        self.store.clone()
    }
}
