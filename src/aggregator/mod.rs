pub mod registry;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use metrics::{counter, gauge};
use rust_decimal::Decimal;
use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{
    Alert, AlertKind, AlertPriority, NewTokenEvent, Token, Trade, TradeAction, TradeEvent,
    TrackedWallet,
};
use crate::services::notifier::{self, Notifier};
use crate::services::wallet_poller;
use crate::solana::address::{is_valid_address, short_address};
use crate::solana::TransactionHistory;
use registry::{SubscriberRegistry, TopicPayload};

/// Which side wins when an inbound payload asserts its own watched flag and
/// the locally computed watch-set membership disagrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchedFlagPolicy {
    /// An explicit flag on the payload wins when present; otherwise the
    /// watch set is consulted.
    #[default]
    PreferExplicit,
    /// Inbound flags are ignored; only watch-set membership counts.
    AlwaysCompute,
}

impl WatchedFlagPolicy {
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "always_compute" => WatchedFlagPolicy::AlwaysCompute,
            _ => WatchedFlagPolicy::PreferExplicit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Addresses considered notable from process start.
    pub seed_watched_wallets: Vec<String>,
    /// Minimum SOL value for a watched buy to raise a top-trader alert.
    pub min_alert_value_sol: Decimal,
    /// Alerts/tokens/trades sequences keep at most this many entries.
    pub retention_cap: usize,
    pub watched_flag_policy: WatchedFlagPolicy,
    pub wallet_poll_interval_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            seed_watched_wallets: Vec::new(),
            min_alert_value_sol: Decimal::ONE,
            retention_cap: 500,
            watched_flag_policy: WatchedFlagPolicy::default(),
            wallet_poll_interval_secs: 60,
        }
    }
}

struct AggState {
    alerts: Vec<Alert>,
    tokens: Vec<Token>,
    trades: Vec<Trade>,
    tracked_wallets: Vec<TrackedWallet>,
    top_wallets: Vec<String>,
    watched: HashSet<String>,
}

/// Single authority over the dashboard's domain state. Every operation is an
/// atomic read-modify-publish step: collections are mutated and snapshotted
/// under one lock, and subscribers only ever see the snapshots — a handler
/// may re-enter the aggregator without deadlocking or observing torn state.
pub struct Aggregator {
    config: AggregatorConfig,
    state: Mutex<AggState>,
    registry: SubscriberRegistry,
    notifier: Option<Arc<Notifier>>,
    history: Arc<dyn TransactionHistory>,
    poller_stop: Mutex<Option<Arc<AtomicBool>>>,
    account_keys_tx: watch::Sender<Vec<String>>,
    token_keys_tx: watch::Sender<Vec<String>>,
}

impl Aggregator {
    pub fn new(
        config: AggregatorConfig,
        history: Arc<dyn TransactionHistory>,
        notifier: Option<Arc<Notifier>>,
    ) -> Self {
        let watched: HashSet<String> = config.seed_watched_wallets.iter().cloned().collect();
        let (account_keys_tx, _) = watch::channel(watched.iter().cloned().collect());
        let (token_keys_tx, _) = watch::channel(Vec::new());

        Self {
            config,
            state: Mutex::new(AggState {
                alerts: Vec::new(),
                tokens: Vec::new(),
                trades: Vec::new(),
                tracked_wallets: Vec::new(),
                top_wallets: Vec::new(),
                watched,
            }),
            registry: SubscriberRegistry::new(),
            notifier,
            history,
            poller_stop: Mutex::new(None),
            account_keys_tx,
            token_keys_tx,
        }
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// Watched-account key set for the exchange-feed account subscription.
    pub fn account_keys(&self) -> watch::Receiver<Vec<String>> {
        self.account_keys_tx.subscribe()
    }

    /// Known-token key set for the exchange-feed token subscription.
    pub fn token_keys(&self) -> watch::Receiver<Vec<String>> {
        self.token_keys_tx.subscribe()
    }

    // -- snapshots ----------------------------------------------------------

    pub fn alerts(&self) -> Vec<Alert> {
        self.state.lock().unwrap().alerts.clone()
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.state.lock().unwrap().tokens.clone()
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.state.lock().unwrap().trades.clone()
    }

    pub fn tracked_wallets(&self) -> Vec<TrackedWallet> {
        self.state.lock().unwrap().tracked_wallets.clone()
    }

    pub fn top_wallets(&self) -> Vec<String> {
        self.state.lock().unwrap().top_wallets.clone()
    }

    pub fn is_watched(&self, address: &str) -> bool {
        self.state.lock().unwrap().watched.contains(address)
    }

    // -- ingestion ----------------------------------------------------------

    /// Ingest a token-descriptor payload from either transport. Duplicate
    /// addresses are ignored; the mint is the collection's unique key.
    pub async fn ingest_new_token(&self, event: NewTokenEvent) {
        let (tokens, alert) = {
            let mut st = self.state.lock().unwrap();

            if st.tokens.iter().any(|t| t.address == event.address) {
                tracing::debug!(address = %event.address, "Token already known, ignoring");
                return;
            }

            let creator_watched = match self.config.watched_flag_policy {
                WatchedFlagPolicy::PreferExplicit => event.is_creator_watched.unwrap_or_else(|| {
                    event
                        .creator
                        .as_deref()
                        .map(|c| st.watched.contains(c))
                        .unwrap_or(false)
                }),
                WatchedFlagPolicy::AlwaysCompute => event
                    .creator
                    .as_deref()
                    .map(|c| st.watched.contains(c))
                    .unwrap_or(false),
            };

            let token = Token {
                id: Uuid::new_v4(),
                address: event.address,
                name: event.name.unwrap_or_else(|| "Unknown Token".into()),
                symbol: event.symbol.unwrap_or_else(|| "???".into()),
                created_at: event.timestamp.unwrap_or_else(Utc::now),
                creator: event.creator,
                is_creator_watched: creator_watched,
                trade_count: 0,
                top_trader_buys: 0,
                market_cap_sol: event.market_cap_sol,
                liquidity_sol: event.liquidity_sol,
                price_sol: event.price_sol,
            };

            tracing::info!(
                address = %token.address,
                symbol = %token.symbol,
                watched_creator = creator_watched,
                "New token ingested"
            );
            counter!("tokens_ingested_total").increment(1);

            let alert = creator_watched.then(|| {
                Alert::new(
                    AlertKind::NewToken,
                    "New Token by Watched Creator",
                    format!("{} ({}) was just launched", token.name, token.symbol),
                    AlertPriority::Medium,
                )
            });

            st.tokens.insert(0, token);
            st.tokens.truncate(self.config.retention_cap);

            let alert = alert.map(|a| {
                st.alerts.insert(0, a.clone());
                st.alerts.truncate(self.config.retention_cap);
                counter!("alerts_emitted_total").increment(1);
                (a, st.alerts.clone())
            });

            (st.tokens.clone(), alert)
        };

        self.sync_feed_subscriptions();
        self.registry.publish(TopicPayload::Tokens(tokens));

        if let Some((alert, alerts)) = alert {
            self.registry.publish(TopicPayload::Alerts(alerts));
            self.notify(notifier::format_new_token_alert(&alert)).await;
        }
    }

    /// Ingest a trade-descriptor payload. The token counters update on a
    /// known mint; a watched trader additionally produces a Trade record and
    /// possibly a high-priority alert.
    pub async fn ingest_trade(&self, event: TradeEvent) {
        let (tokens, watched_part) = {
            let mut st = self.state.lock().unwrap();

            let trader_watched = match self.config.watched_flag_policy {
                WatchedFlagPolicy::PreferExplicit => event
                    .is_top_buyer
                    .unwrap_or_else(|| st.watched.contains(&event.wallet)),
                WatchedFlagPolicy::AlwaysCompute => st.watched.contains(&event.wallet),
            };

            let mut token_name = event.token_name.clone();
            let mut token_symbol = event.token_symbol.clone();

            if let Some(token) = st.tokens.iter_mut().find(|t| t.address == event.token) {
                token.trade_count += 1;
                if trader_watched {
                    token.top_trader_buys += 1;
                }
                if token_name.is_none() {
                    token_name = Some(token.name.clone());
                }
                if token_symbol.is_none() {
                    token_symbol = Some(token.symbol.clone());
                }
            }

            counter!("trades_ingested_total").increment(1);
            let tokens = st.tokens.clone();

            let watched_part = if trader_watched {
                let display_name = st
                    .tracked_wallets
                    .iter()
                    .find(|w| w.address == event.wallet)
                    .map(|w| w.display_name.clone());

                let trade = Trade {
                    id: Uuid::new_v4(),
                    token_address: event.token.clone(),
                    wallet: event.wallet.clone(),
                    display_name,
                    token_name,
                    token_symbol: token_symbol.clone(),
                    action: event.action,
                    amount: event.amount,
                    value_sol: event.value_sol,
                    timestamp: event.timestamp.unwrap_or_else(Utc::now),
                    signature: event.signature.clone(),
                };

                st.trades.insert(0, trade.clone());
                st.trades.truncate(self.config.retention_cap);
                let trades = st.trades.clone();

                let significant_buy = event.action == TradeAction::Buy
                    && event.value_sol > self.config.min_alert_value_sol;
                let alert = significant_buy.then(|| {
                    let alert = Alert::new(
                        AlertKind::TopTraderBuy,
                        "Top Trader Buy",
                        format!(
                            "{} bought {}",
                            short_address(&event.wallet),
                            token_symbol.unwrap_or_else(|| short_address(&event.token)),
                        ),
                        AlertPriority::High,
                    );
                    st.alerts.insert(0, alert.clone());
                    st.alerts.truncate(self.config.retention_cap);
                    counter!("alerts_emitted_total").increment(1);
                    (alert, st.alerts.clone())
                });

                Some((trade, trades, alert))
            } else {
                None
            };

            (tokens, watched_part)
        };

        self.registry.publish(TopicPayload::Tokens(tokens));

        if let Some((trade, trades, alert)) = watched_part {
            tracing::info!(
                wallet = %trade.wallet,
                token = %trade.token_address,
                action = %trade.action,
                value_sol = %trade.value_sol,
                "Watched-wallet trade recorded"
            );
            self.registry.publish(TopicPayload::Trades(trades));

            if let Some((_, alerts)) = alert {
                self.registry.publish(TopicPayload::Alerts(alerts));
                self.notify(notifier::format_top_trader_alert(&trade)).await;
            }
        }
    }

    /// Replace the notable-wallet list pushed by the application server.
    pub fn ingest_top_wallets(&self, wallets: Vec<String>) {
        let top_wallets = {
            let mut st = self.state.lock().unwrap();
            st.top_wallets = wallets;
            self.recompute_watched(&mut st);
            st.top_wallets.clone()
        };

        self.sync_feed_subscriptions();
        self.registry.publish(TopicPayload::TopWallets(top_wallets));
    }

    // -- wallet tracking ----------------------------------------------------

    /// Start watching a wallet. Returns false (no mutation) on a malformed
    /// address or a duplicate; the first tracked wallet starts the activity
    /// poller.
    pub async fn track_wallet(self: &Arc<Self>, address: &str, display_name: Option<&str>) -> bool {
        if !is_valid_address(address) {
            tracing::warn!(address, "Rejected track request: invalid address");
            self.notify(format!("Invalid wallet address: {address}")).await;
            return false;
        }

        let snapshot = {
            let mut st = self.state.lock().unwrap();
            if st.tracked_wallets.iter().any(|w| w.address == address) {
                None
            } else {
                let display_name = display_name
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Wallet {}", short_address(address)));

                st.tracked_wallets.push(TrackedWallet {
                    address: address.to_string(),
                    display_name,
                    last_checked: Utc::now(),
                });
                st.watched.insert(address.to_string());
                gauge!("tracked_wallets").set(st.tracked_wallets.len() as f64);
                Some(st.tracked_wallets.clone())
            }
        };

        let Some(wallets) = snapshot else {
            tracing::info!(address, "Wallet already tracked");
            self.notify(format!("{} is already tracked", short_address(address)))
                .await;
            return false;
        };

        tracing::info!(address, count = wallets.len(), "Wallet tracked");
        let first = wallets.len() == 1;
        self.sync_feed_subscriptions();
        self.registry.publish(TopicPayload::TrackedWallets(wallets));

        if first {
            self.start_wallet_poller();
        }
        true
    }

    /// Stop watching a wallet. Returns false without publishing when the
    /// address was never tracked; removing the last wallet stops the poller.
    pub fn remove_tracked_wallet(&self, address: &str) -> bool {
        let snapshot = {
            let mut st = self.state.lock().unwrap();
            let before = st.tracked_wallets.len();
            st.tracked_wallets.retain(|w| w.address != address);
            if st.tracked_wallets.len() == before {
                None
            } else {
                self.recompute_watched(&mut st);
                gauge!("tracked_wallets").set(st.tracked_wallets.len() as f64);
                Some(st.tracked_wallets.clone())
            }
        };

        let Some(wallets) = snapshot else {
            tracing::debug!(address, "Untrack request for unknown wallet");
            return false;
        };

        tracing::info!(address, remaining = wallets.len(), "Wallet untracked");
        let empty = wallets.is_empty();
        self.sync_feed_subscriptions();
        self.registry.publish(TopicPayload::TrackedWallets(wallets));

        if empty {
            if let Some(stop) = self.poller_stop.lock().unwrap().take() {
                stop.store(true, Ordering::Relaxed);
                tracing::info!("Last tracked wallet removed, stopping activity poller");
            }
        }
        true
    }

    /// One polling cycle: fetch each tracked wallet's transactions since its
    /// last check and surface every incoming token transfer as an implicit
    /// buy. A fetch failure skips that wallet only.
    pub async fn check_tracked_wallets(&self) {
        let wallets = self.tracked_wallets();
        if wallets.is_empty() {
            return;
        }

        tracing::debug!(count = wallets.len(), "Checking tracked wallets for activity");

        for wallet in wallets {
            let now = Utc::now();
            let fetched = self
                .history
                .transactions_since(&wallet.address, wallet.last_checked)
                .await;

            // The check timestamp advances regardless of fetch outcome.
            {
                let mut st = self.state.lock().unwrap();
                if let Some(entry) = st
                    .tracked_wallets
                    .iter_mut()
                    .find(|w| w.address == wallet.address)
                {
                    entry.last_checked = now;
                }
            }

            let transactions = match fetched {
                Ok(txs) => txs,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        address = %wallet.address,
                        "History fetch failed, skipping wallet this cycle"
                    );
                    counter!("history_fetch_failures_total").increment(1);
                    continue;
                }
            };

            for tx in &transactions {
                for transfer in &tx.token_transfers {
                    if transfer.to_user_account.as_deref() != Some(wallet.address.as_str()) {
                        continue;
                    }
                    self.record_wallet_purchase(&wallet, tx, transfer).await;
                }
            }
        }

        let wallets = self.tracked_wallets();
        self.registry.publish(TopicPayload::TrackedWallets(wallets));
    }

    async fn record_wallet_purchase(
        &self,
        wallet: &TrackedWallet,
        tx: &crate::solana::WalletTransaction,
        transfer: &crate::solana::history_client::TokenTransfer,
    ) {
        let (trade, trades, alerts) = {
            let mut st = self.state.lock().unwrap();

            let known = st.tokens.iter().find(|t| t.address == transfer.mint);
            let token_name = known.map(|t| t.name.clone());
            let token_symbol = known.map(|t| t.symbol.clone());

            let trade = Trade {
                id: Uuid::new_v4(),
                token_address: transfer.mint.clone(),
                wallet: wallet.address.clone(),
                display_name: Some(wallet.display_name.clone()),
                token_name,
                token_symbol: token_symbol.clone(),
                action: TradeAction::Buy,
                amount: transfer.token_amount.unwrap_or(Decimal::ZERO),
                value_sol: Decimal::ZERO,
                timestamp: tx.occurred_at().unwrap_or_else(Utc::now),
                signature: tx.signature.clone(),
            };

            st.trades.insert(0, trade.clone());
            st.trades.truncate(self.config.retention_cap);

            let alert = Alert::new(
                AlertKind::TrackedWalletPurchase,
                "Tracked Wallet Purchase",
                format!(
                    "{} bought {}",
                    wallet.display_name,
                    token_symbol.unwrap_or_else(|| short_address(&transfer.mint)),
                ),
                AlertPriority::High,
            );
            st.alerts.insert(0, alert);
            st.alerts.truncate(self.config.retention_cap);
            counter!("alerts_emitted_total").increment(1);

            (trade, st.trades.clone(), st.alerts.clone())
        };

        tracing::info!(
            wallet = %trade.wallet,
            mint = %trade.token_address,
            "Tracked wallet purchase detected"
        );

        self.registry.publish(TopicPayload::Trades(trades));
        self.registry.publish(TopicPayload::Alerts(alerts));
        self.notify(notifier::format_tracked_purchase_alert(&trade))
            .await;
    }

    // -- internals ----------------------------------------------------------

    fn recompute_watched(&self, st: &mut AggState) {
        st.watched = self
            .config
            .seed_watched_wallets
            .iter()
            .chain(st.top_wallets.iter())
            .chain(st.tracked_wallets.iter().map(|w| &w.address))
            .cloned()
            .collect();
    }

    /// Push the current key sets to the exchange-feed listener; the listener
    /// diffs against what it already subscribed and issues only the new keys.
    fn sync_feed_subscriptions(&self) {
        let (accounts, tokens) = {
            let st = self.state.lock().unwrap();
            let mut accounts: Vec<String> = st.watched.iter().cloned().collect();
            accounts.sort();
            let tokens: Vec<String> = st.tokens.iter().map(|t| t.address.clone()).collect();
            (accounts, tokens)
        };
        self.account_keys_tx.send_replace(accounts);
        self.token_keys_tx.send_replace(tokens);
    }

    fn start_wallet_poller(self: &Arc<Self>) {
        let mut guard = self.poller_stop.lock().unwrap();
        if guard.is_some() {
            return;
        }
        let stop = Arc::new(AtomicBool::new(false));
        *guard = Some(Arc::clone(&stop));

        tokio::spawn(wallet_poller::run_wallet_poller(
            Arc::clone(self),
            stop,
            self.config.wallet_poll_interval_secs,
        ));
    }

    async fn notify(&self, message: String) {
        if let Some(notifier) = &self.notifier {
            notifier.send(&message).await;
        }
    }
}
