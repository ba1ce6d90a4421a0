//! Background eviction of expired challenges.
//!
//! Redeem already evicts lazily, but identities that are issued a code and
//! never come back would otherwise accumulate forever. The sweeper drops
//! them on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use super::OtpStore;

/// Periodically purge expired challenges from the store
pub async fn sweeper_worker(
    store: Arc<OtpStore>,
    interval_secs: u64,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    tracing::info!(interval_secs, "🧹 Challenge sweeper started");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {
                let removed = store.purge_expired().await;
                if removed > 0 {
                    let stats = store.stats().await;
                    tracing::debug!(
                        removed,
                        pending = stats.pending,
                        evicted_total = stats.evicted,
                        "Swept expired challenges"
                    );
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("🧹 Challenge sweeper shutting down...");
                break;
            }
        }
    }
}
