//! Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! Reads already expire entries lazily, so the sweep exists to bound
//! memory for keys that are written but never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the given interval
/// between runs. Each run takes the store's write lock and calls
/// `cleanup()`, which fires the store's `on_expire` callback per removed
/// key.
///
/// The returned handle is the only way to end the task: abort it during
/// teardown (SharedCache's `stop()` does exactly this).
pub fn spawn_sweep_task<V>(store: SharedStore<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store_guard = store.write().await;
                store_guard.cleanup()
            };

            if removed > 0 {
                info!(removed, "sweep removed expired entries");
            } else {
                debug!("sweep found no expired entries");
            }
        }
    })
}
