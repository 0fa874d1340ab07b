use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use crate::models::IngestEvent;
use crate::solana::LaunchClient;

const RECENT_COINS_LIMIT: u32 = 50;

/// Run the new-token poller. Periodically fetches the most recently created
/// coins from the launchpad REST API and feeds them into the pipeline; the
/// aggregator deduplicates by mint, so overlap between cycles is harmless.
/// Independent of the wallet poller and runs for the life of the process.
pub async fn run_token_poller(
    launch_client: LaunchClient,
    tx: mpsc::Sender<IngestEvent>,
    interval_secs: u64,
) {
    tracing::info!(interval_secs, "Token launch poller started");
    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;

        let coins = match launch_client.recent_coins(RECENT_COINS_LIMIT).await {
            Ok(coins) => coins,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch recent launches");
                continue;
            }
        };

        tracing::debug!(count = coins.len(), "Token poller cycle fetched launches");

        for coin in coins {
            let event = IngestEvent::NewToken(coin.into_event());
            if let Err(e) = tx.send(event).await {
                tracing::error!(error = %e, "Failed to send launch event to pipeline");
                return;
            }
        }
    }
}
