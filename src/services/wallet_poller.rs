use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::aggregator::Aggregator;

/// Poll tracked wallets for fresh activity.
///
/// The aggregator starts this loop when the first wallet is tracked and
/// raises `stop` when the last one is removed. The flag is checked at the
/// top of each cycle, so stopping never interrupts an in-flight history
/// fetch — a late cycle's results are still applied.
pub async fn run_wallet_poller(
    aggregator: Arc<Aggregator>,
    stop: Arc<AtomicBool>,
    interval_secs: u64,
) {
    tracing::info!(interval_secs, "Wallet activity poller started");

    loop {
        sleep(Duration::from_secs(interval_secs)).await;

        if stop.load(Ordering::Relaxed) {
            break;
        }

        aggregator.check_tracked_wallets().await;
    }

    tracing::info!("Wallet activity poller stopped");
}
