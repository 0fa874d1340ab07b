use serde::Serialize;
use tokio::sync::broadcast;

use crate::aggregator::registry::{SubscriberRegistry, Topic, TopicPayload};
use crate::models::{Alert, Token, Trade, TrackedWallet};

/// Messages broadcast to all connected WebSocket clients. Tag names match
/// the topics the dashboard subscribes to; every payload is the full
/// current sequence, never a delta.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "alertsUpdate")]
    AlertsUpdate(Vec<Alert>),

    #[serde(rename = "tokensUpdate")]
    TokensUpdate(Vec<Token>),

    #[serde(rename = "tradesUpdate")]
    TradesUpdate(Vec<Trade>),

    #[serde(rename = "trackedWalletsUpdate")]
    TrackedWalletsUpdate(Vec<TrackedWallet>),

    #[serde(rename = "topWalletsUpdate")]
    TopWalletsUpdate(Vec<String>),
}

impl From<&TopicPayload> for WsMessage {
    fn from(payload: &TopicPayload) -> Self {
        match payload {
            TopicPayload::Alerts(alerts) => WsMessage::AlertsUpdate(alerts.clone()),
            TopicPayload::Tokens(tokens) => WsMessage::TokensUpdate(tokens.clone()),
            TopicPayload::Trades(trades) => WsMessage::TradesUpdate(trades.clone()),
            TopicPayload::TrackedWallets(wallets) => {
                WsMessage::TrackedWalletsUpdate(wallets.clone())
            }
            TopicPayload::TopWallets(wallets) => WsMessage::TopWalletsUpdate(wallets.clone()),
        }
    }
}

/// Forward every registry publish to the dashboard broadcast channel. A send
/// with no connected clients is not an error.
pub fn bridge_registry(registry: &SubscriberRegistry, ws_tx: broadcast::Sender<WsMessage>) {
    for topic in Topic::ALL {
        let ws_tx = ws_tx.clone();
        registry.subscribe(topic, move |payload| {
            let _ = ws_tx.send(WsMessage::from(payload));
            Ok(())
        });
    }
}
