//! Fetch Cache demo
//!
//! Wires a shared process cache with its background sweep, runs a fetch
//! binding against it, and prints the resulting counters.

use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetch_cache::{Config, SharedCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_size={}, default_ttl={}ms, sweep_interval={}s",
        config.max_size,
        config.default_ttl.as_millis(),
        config.sweep_interval.as_secs()
    );

    let cache: SharedCache<String> = SharedCache::new(&config);
    cache.start()?;
    info!("Shared cache initialized, sweep running");

    // A fetcher standing in for a slow upstream lookup
    let binding = cache
        .binding("greeting", || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok("hello from upstream".to_string())
        })
        .await;
    info!(value = ?binding.value().await, "initial fetch settled");

    // Served from the cache: the fetcher does not run again
    binding.fetch(false).await;
    info!(value = ?binding.value().await, "second fetch settled");

    // Out-of-band invalidation, then a forced refresh
    cache.invalidate("greeting").await;
    binding.refresh().await;
    info!(value = ?binding.value().await, "refresh settled");

    let stats = cache.stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    cache.stop();
    info!("Sweep stopped, shutting down");

    Ok(())
}
