use std::collections::HashSet;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::ingestion::normalize::normalize_feed_frame;
use crate::models::IngestEvent;

const PING_INTERVAL: Duration = Duration::from_secs(25);
const BASE_RECONNECT_DELAY: Duration = Duration::from_secs(2);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

#[derive(Debug, Serialize)]
struct SubscribeCommand {
    method: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    keys: Vec<String>,
}

impl SubscribeCommand {
    fn new_tokens() -> Self {
        Self {
            method: "subscribeNewToken",
            keys: Vec::new(),
        }
    }

    fn account_trades(keys: Vec<String>) -> Self {
        Self {
            method: "subscribeAccountTrade",
            keys,
        }
    }

    fn token_trades(keys: Vec<String>) -> Self {
        Self {
            method: "subscribeTokenTrade",
            keys,
        }
    }
}

/// Run the exchange-feed WebSocket listener.
///
/// On connect the listener subscribes to new-token events, trades by the
/// watched accounts, and trades on the known tokens. `account_rx` and
/// `token_rx` deliver updated key sets from the aggregator; only keys not
/// yet subscribed on the current connection are re-issued.
pub async fn run_feed_listener(
    ws_url: String,
    mut account_rx: watch::Receiver<Vec<String>>,
    mut token_rx: watch::Receiver<Vec<String>>,
    tx: mpsc::Sender<IngestEvent>,
) {
    let mut attempt: u32 = 0;

    loop {
        tracing::info!(url = %ws_url, "Connecting to exchange feed...");

        match connect_async(&ws_url).await {
            Ok((ws_stream, _response)) => {
                tracing::info!("Exchange feed connected");
                attempt = 0;

                let (write, read) = ws_stream.split();
                drive_connection(write, read, &mut account_rx, &mut token_rx, &tx).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Exchange feed connection failed");
            }
        }

        // Exponential backoff with cap
        let delay = BASE_RECONNECT_DELAY * 2u32.saturating_pow(attempt);
        let delay = delay.min(MAX_RECONNECT_DELAY);
        attempt = attempt.saturating_add(1);
        tracing::info!(delay_secs = delay.as_secs(), attempt, "Reconnecting...");
        sleep(delay).await;
    }
}

/// Drive one connection until it fails; returning triggers a reconnect.
async fn drive_connection(
    mut write: WsSink,
    mut read: WsSource,
    account_rx: &mut watch::Receiver<Vec<String>>,
    token_rx: &mut watch::Receiver<Vec<String>>,
    tx: &mpsc::Sender<IngestEvent>,
) {
    // Subscription state is per-connection.
    let mut subscribed_accounts: HashSet<String> = HashSet::new();
    let mut subscribed_tokens: HashSet<String> = HashSet::new();
    subscribed_accounts.extend(account_rx.borrow().iter().cloned());
    subscribed_tokens.extend(token_rx.borrow().iter().cloned());

    let mut initial = vec![SubscribeCommand::new_tokens()];
    if !subscribed_accounts.is_empty() {
        initial.push(SubscribeCommand::account_trades(
            subscribed_accounts.iter().cloned().collect(),
        ));
    }
    if !subscribed_tokens.is_empty() {
        initial.push(SubscribeCommand::token_trades(
            subscribed_tokens.iter().cloned().collect(),
        ));
    }
    for command in &initial {
        if let Err(e) = send_command(&mut write, command).await {
            tracing::error!(error = %e, "Failed to send subscribe command");
            return;
        }
    }
    tracing::info!(
        accounts = subscribed_accounts.len(),
        tokens = subscribed_tokens.len(),
        "Subscribed to feed streams"
    );

    let mut ping_timer = interval(PING_INTERVAL);
    ping_timer.tick().await; // consume the first immediate tick

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(text.as_ref(), tx).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            tracing::warn!(error = %e, "Failed to send pong");
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::warn!("Exchange feed sent close frame");
                        return;
                    }
                    Some(Ok(_)) => {} // Binary, Pong, Frame — ignore
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Exchange feed read error");
                        return;
                    }
                    None => {
                        tracing::warn!("Exchange feed stream ended");
                        return;
                    }
                }
            }
            _ = ping_timer.tick() => {
                if let Err(e) = write.send(Message::Ping(vec![].into())).await {
                    tracing::warn!(error = %e, "Failed to send ping");
                    return;
                }
            }
            result = account_rx.changed() => {
                if result.is_err() {
                    tracing::warn!("Account key channel closed");
                    return;
                }
                let new_keys = diff_keys(&account_rx.borrow(), &mut subscribed_accounts);
                if !new_keys.is_empty() {
                    tracing::info!(count = new_keys.len(), "Subscribing to new account keys");
                    let command = SubscribeCommand::account_trades(new_keys);
                    if let Err(e) = send_command(&mut write, &command).await {
                        tracing::error!(error = %e, "Failed to send subscribe command");
                        return;
                    }
                }
            }
            result = token_rx.changed() => {
                if result.is_err() {
                    tracing::warn!("Token key channel closed");
                    return;
                }
                let new_keys = diff_keys(&token_rx.borrow(), &mut subscribed_tokens);
                if !new_keys.is_empty() {
                    tracing::info!(count = new_keys.len(), "Subscribing to new token keys");
                    let command = SubscribeCommand::token_trades(new_keys);
                    if let Err(e) = send_command(&mut write, &command).await {
                        tracing::error!(error = %e, "Failed to send subscribe command");
                        return;
                    }
                }
            }
        }
    }
}

async fn send_command(write: &mut WsSink, command: &SubscribeCommand) -> anyhow::Result<()> {
    let json = serde_json::to_string(command)?;
    write.send(Message::Text(json.into())).await?;
    Ok(())
}

/// Keys present in `current` but not yet subscribed; marks them subscribed.
fn diff_keys(current: &[String], subscribed: &mut HashSet<String>) -> Vec<String> {
    current
        .iter()
        .filter(|k| subscribed.insert((*k).clone()))
        .cloned()
        .collect()
}

async fn handle_text_message(text: &str, tx: &mpsc::Sender<IngestEvent>) {
    match normalize_feed_frame(text) {
        Some(event) => {
            if let Err(e) = tx.send(event).await {
                tracing::error!(error = %e, "Failed to send ingest event to pipeline");
            }
        }
        None => {
            metrics::counter!("frames_dropped_total").increment(1);
            tracing::debug!(raw = %text, "Non-event feed frame dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_keys_returns_only_unseen() {
        let mut subscribed = HashSet::new();
        let first = diff_keys(&["a".into(), "b".into()], &mut subscribed);
        assert_eq!(first, vec!["a".to_string(), "b".to_string()]);

        let second = diff_keys(&["a".into(), "b".into(), "c".into()], &mut subscribed);
        assert_eq!(second, vec!["c".to_string()]);
    }

    #[test]
    fn subscribe_command_omits_empty_keys() {
        let json = serde_json::to_string(&SubscribeCommand::new_tokens()).unwrap();
        assert_eq!(json, r#"{"method":"subscribeNewToken"}"#);

        let json =
            serde_json::to_string(&SubscribeCommand::token_trades(vec!["mint1".into()])).unwrap();
        assert_eq!(json, r#"{"method":"subscribeTokenTrade","keys":["mint1"]}"#);
    }
}
