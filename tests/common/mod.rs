use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rust_decimal::Decimal;
use tokio::sync::broadcast;

use trenchsniper::aggregator::{Aggregator, AggregatorConfig};
use trenchsniper::api::router::create_router;
use trenchsniper::api::ws_types::WsMessage;
use trenchsniper::config::AppConfig;
use trenchsniper::models::{NewTokenEvent, TradeAction, TradeEvent};
use trenchsniper::solana::{HistoryError, TransactionHistory, WalletTransaction};
use trenchsniper::AppState;

// Well-known on-chain addresses reused as valid wallet keys in tests.
pub const WALLET_A: &str = "So11111111111111111111111111111111111111112";
pub const WALLET_B: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Canned transaction-history provider for exercising the polling path.
#[derive(Default)]
pub struct StubHistory {
    pub canned: Mutex<HashMap<String, Vec<WalletTransaction>>>,
    pub fail_for: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TransactionHistory for StubHistory {
    async fn transactions_since(
        &self,
        address: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<WalletTransaction>, HistoryError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if self.fail_for.lock().unwrap().contains(address) {
            return Err(HistoryError::Unexpected("stub failure".into()));
        }

        Ok(self
            .canned
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

#[allow(dead_code)]
pub fn test_config(seed_wallets: &[&str]) -> AggregatorConfig {
    AggregatorConfig {
        seed_watched_wallets: seed_wallets.iter().map(|s| s.to_string()).collect(),
        ..AggregatorConfig::default()
    }
}

#[allow(dead_code)]
pub fn build_aggregator(seed_wallets: &[&str]) -> Arc<Aggregator> {
    build_aggregator_with_history(seed_wallets, Arc::new(StubHistory::default()))
}

#[allow(dead_code)]
pub fn build_aggregator_with_history(
    seed_wallets: &[&str],
    history: Arc<StubHistory>,
) -> Arc<Aggregator> {
    Arc::new(Aggregator::new(test_config(seed_wallets), history, None))
}

#[allow(dead_code)]
pub fn make_token_event(address: &str, name: &str, symbol: &str, creator: &str) -> NewTokenEvent {
    NewTokenEvent {
        address: address.into(),
        name: Some(name.into()),
        symbol: Some(symbol.into()),
        creator: Some(creator.into()),
        is_creator_watched: None,
        market_cap_sol: Some(Decimal::from(30)),
        liquidity_sol: None,
        price_sol: None,
        timestamp: None,
    }
}

#[allow(dead_code)]
pub fn make_trade_event(
    token: &str,
    wallet: &str,
    action: TradeAction,
    amount: i64,
    value_sol: i64,
) -> TradeEvent {
    TradeEvent {
        token: token.into(),
        wallet: wallet.into(),
        token_name: None,
        token_symbol: None,
        action,
        amount: Decimal::from(amount),
        value_sol: Decimal::from(value_sol),
        is_top_buyer: None,
        timestamp: None,
        signature: None,
    }
}

/// Build a Prometheus handle without installing the global recorder, so
/// every test can have its own.
#[allow(dead_code)]
pub fn test_metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

#[allow(dead_code)]
pub fn test_app_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        feed_ws_url: "wss://localhost".into(),
        feed_enabled: false,
        server_ws_url: None,
        launch_api_url: "http://localhost".into(),
        token_poller_enabled: false,
        token_poll_interval_secs: 300,
        history_api_url: "http://localhost".into(),
        history_api_key: None,
        wallet_poll_interval_secs: 60,
        seed_watched_wallets: vec![],
        min_alert_value_sol: Decimal::ONE,
        retention_cap: 500,
        watched_flag_policy: Default::default(),
        telegram_bot_token: None,
        telegram_chat_id: None,
        notifications_enabled: false,
    }
}

#[allow(dead_code)]
pub fn build_test_app(aggregator: Arc<Aggregator>) -> axum::Router {
    let (ws_tx, _) = broadcast::channel::<WsMessage>(16);

    let state = AppState {
        config: test_app_config(),
        aggregator,
        ws_tx,
        metrics_handle: test_metrics_handle(),
    };

    create_router(state)
}
