use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tokio::sync::mpsc;

use crate::aggregator::Aggregator;
use crate::models::IngestEvent;

/// Consume normalized transport events and apply them to the aggregator.
/// Each event is one atomic read-modify-publish step; the channel closing
/// means every producer is gone.
pub async fn run_pipeline(mut rx: mpsc::Receiver<IngestEvent>, aggregator: Arc<Aggregator>) {
    while let Some(event) = rx.recv().await {
        let start = Instant::now();

        match event {
            IngestEvent::NewToken(token) => aggregator.ingest_new_token(token).await,
            IngestEvent::Trade(trade) => aggregator.ingest_trade(trade).await,
            IngestEvent::TopWallets(wallets) => aggregator.ingest_top_wallets(wallets),
        }

        histogram!("ingest_latency_seconds").record(start.elapsed().as_secs_f64());
    }

    tracing::warn!("Ingest event channel closed");
}
