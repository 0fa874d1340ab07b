use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::ingestion::normalize::normalize_server_frame;
use crate::models::IngestEvent;

const PING_INTERVAL: Duration = Duration::from_secs(25);
const BASE_RECONNECT_DELAY: Duration = Duration::from_secs(2);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Run the application-server channel listener. The server pushes named
/// `{event, data}` frames (newToken / newTrade / topWallets); everything
/// else is dropped. Reconnection policy matches the exchange-feed listener.
pub async fn run_server_listener(ws_url: String, tx: mpsc::Sender<IngestEvent>) {
    let mut attempt: u32 = 0;

    loop {
        tracing::info!(url = %ws_url, "Connecting to application server channel...");

        match connect_async(&ws_url).await {
            Ok((ws_stream, _response)) => {
                tracing::info!("Application server channel connected");
                attempt = 0;

                let (mut write, mut read) = ws_stream.split();
                let mut ping_timer = interval(PING_INTERVAL);
                ping_timer.tick().await;

                loop {
                    tokio::select! {
                        msg = read.next() => {
                            match msg {
                                Some(Ok(Message::Text(text))) => {
                                    match normalize_server_frame(text.as_ref()) {
                                        Some(event) => {
                                            if let Err(e) = tx.send(event).await {
                                                tracing::error!(error = %e, "Failed to send ingest event to pipeline");
                                            }
                                        }
                                        None => {
                                            metrics::counter!("frames_dropped_total").increment(1);
                                            tracing::warn!(raw = %text, "Unknown server channel frame dropped");
                                        }
                                    }
                                }
                                Some(Ok(Message::Ping(data))) => {
                                    if let Err(e) = write.send(Message::Pong(data)).await {
                                        tracing::warn!(error = %e, "Failed to send pong");
                                        break;
                                    }
                                }
                                Some(Ok(Message::Close(_))) => {
                                    tracing::warn!("Server channel sent close frame");
                                    break;
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    tracing::error!(error = %e, "Server channel read error");
                                    break;
                                }
                                None => {
                                    tracing::warn!("Server channel stream ended");
                                    break;
                                }
                            }
                        }
                        _ = ping_timer.tick() => {
                            if let Err(e) = write.send(Message::Ping(vec![].into())).await {
                                tracing::warn!(error = %e, "Failed to send ping");
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Server channel connection failed");
            }
        }

        let delay = BASE_RECONNECT_DELAY * 2u32.saturating_pow(attempt);
        let delay = delay.min(MAX_RECONNECT_DELAY);
        attempt = attempt.saturating_add(1);
        tracing::info!(delay_secs = delay.as_secs(), attempt, "Reconnecting...");
        sleep(delay).await;
    }
}
