use serde_json::json;

use crate::models::{Alert, Trade};
use crate::solana::address::short_address;

/// Telegram notification service. Failures are logged but never block the
/// aggregation flow.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            chat_id,
        }
    }

    /// Send a Telegram message. Failures are logged as warnings.
    pub async fn send(&self, message: &str) {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );

        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    tracing::warn!(
                        status = %resp.status(),
                        "Telegram sendMessage returned non-2xx"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send Telegram notification");
            }
        }
    }
}

/// Format a top-trader buy notification.
pub fn format_top_trader_alert(trade: &Trade) -> String {
    format!(
        "*Top Trader Buy*\nWallet: `{}`\nToken: {}\nAmount: {}\nValue: {} SOL",
        short_address(&trade.wallet),
        trade
            .token_symbol
            .clone()
            .unwrap_or_else(|| short_address(&trade.token_address)),
        trade.amount,
        trade.value_sol,
    )
}

/// Format a watched-creator launch notification.
pub fn format_new_token_alert(alert: &Alert) -> String {
    format!("*{}*\n{}", alert.title, alert.description)
}

/// Format a tracked-wallet purchase notification.
pub fn format_tracked_purchase_alert(trade: &Trade) -> String {
    format!(
        "*Tracked Wallet Purchase*\n{} bought {}\nSignature: `{}`",
        trade
            .display_name
            .clone()
            .unwrap_or_else(|| short_address(&trade.wallet)),
        trade
            .token_symbol
            .clone()
            .unwrap_or_else(|| short_address(&trade.token_address)),
        trade.signature.as_deref().unwrap_or("unknown"),
    )
}
