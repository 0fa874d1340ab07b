use rust_decimal::Decimal;
use std::env;

use crate::aggregator::{AggregatorConfig, WatchedFlagPolicy};

const DEFAULT_FEED_WS_URL: &str = "wss://pumpportal.fun/api/data";
const DEFAULT_LAUNCH_API_URL: &str = "https://frontend-api.pump.fun";
const DEFAULT_HISTORY_API_URL: &str = "https://api.helius.xyz";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Exchange feed (pump.fun-style data stream)
    pub feed_ws_url: String,
    pub feed_enabled: bool,

    // Application server channel (optional upstream relay)
    pub server_ws_url: Option<String>,

    // Launchpad REST API for the new-token poller
    pub launch_api_url: String,
    pub token_poller_enabled: bool,
    pub token_poll_interval_secs: u64,

    // Transaction history API for tracked-wallet polling
    pub history_api_url: String,
    pub history_api_key: Option<String>,
    pub wallet_poll_interval_secs: u64,

    // Aggregation
    pub seed_watched_wallets: Vec<String>,
    pub min_alert_value_sol: Decimal,
    pub retention_cap: usize,
    pub watched_flag_policy: WatchedFlagPolicy,

    // Notifications
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub notifications_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let seed_raw = env::var("SEED_WATCHED_WALLETS").unwrap_or_default();
        let seed_watched_wallets: Vec<String> = seed_raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            feed_ws_url: env::var("FEED_WS_URL")
                .unwrap_or_else(|_| DEFAULT_FEED_WS_URL.into()),
            feed_enabled: env::var("FEED_ENABLED")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),

            server_ws_url: env::var("SERVER_WS_URL").ok().filter(|s| !s.is_empty()),

            launch_api_url: env::var("LAUNCH_API_URL")
                .unwrap_or_else(|_| DEFAULT_LAUNCH_API_URL.into()),
            token_poller_enabled: env::var("TOKEN_POLLER_ENABLED")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
            token_poll_interval_secs: env::var("TOKEN_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .unwrap_or(300),

            history_api_url: env::var("HISTORY_API_URL")
                .unwrap_or_else(|_| DEFAULT_HISTORY_API_URL.into()),
            history_api_key: env::var("HISTORY_API_KEY").ok().filter(|s| !s.is_empty()),
            wallet_poll_interval_secs: env::var("WALLET_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),

            seed_watched_wallets,
            min_alert_value_sol: env::var("MIN_ALERT_VALUE_SOL")
                .unwrap_or_else(|_| "1".into())
                .parse()
                .unwrap_or(Decimal::ONE),
            retention_cap: env::var("RETENTION_CAP")
                .unwrap_or_else(|_| "500".into())
                .parse()
                .unwrap_or(500),
            watched_flag_policy: WatchedFlagPolicy::from_env_str(
                &env::var("WATCHED_FLAG_POLICY").unwrap_or_default(),
            ),

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok().filter(|s| !s.is_empty()),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty()),
            notifications_enabled: env::var("NOTIFICATIONS_ENABLED")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),
        })
    }

    /// Returns true if Telegram notifications are fully configured.
    pub fn has_telegram(&self) -> bool {
        self.notifications_enabled
            && self.telegram_bot_token.is_some()
            && self.telegram_chat_id.is_some()
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            seed_watched_wallets: self.seed_watched_wallets.clone(),
            min_alert_value_sol: self.min_alert_value_sol,
            retention_cap: self.retention_cap,
            watched_flag_policy: self.watched_flag_policy,
            wallet_poll_interval_secs: self.wallet_poll_interval_secs,
        }
    }
}
