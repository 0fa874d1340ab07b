pub mod alert;
pub mod token;
pub mod trade;
pub mod wallet;

pub use alert::{Alert, AlertKind, AlertPriority};
pub use token::Token;
pub use trade::Trade;
pub use wallet::TrackedWallet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TradeAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "buy" => Some(TradeAction::Buy),
            "sell" => Some(TradeAction::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingest events — normalized pipeline messages
// ---------------------------------------------------------------------------

/// A token-descriptor payload from either transport. Everything except the
/// mint address is optional; the aggregator fills placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTokenEvent {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub creator: Option<String>,
    /// Watched flag asserted by the transport, when present. Precedence
    /// against the locally computed watch set is a configurable policy.
    pub is_creator_watched: Option<bool>,
    pub market_cap_sol: Option<Decimal>,
    pub liquidity_sol: Option<Decimal>,
    pub price_sol: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A trade-descriptor payload referencing a token and a trader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub token: String,
    pub wallet: String,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub action: TradeAction,
    pub amount: Decimal,
    pub value_sol: Decimal,
    pub is_top_buyer: Option<bool>,
    pub timestamp: Option<DateTime<Utc>>,
    pub signature: Option<String>,
}

/// Normalized transport message, produced by the listeners and consumed by
/// the pipeline task.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    NewToken(NewTokenEvent),
    Trade(TradeEvent),
    TopWallets(Vec<String>),
}

impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade: wallet={} token={} action={} amount={} value={}",
            &self.wallet[..8.min(self.wallet.len())],
            &self.token[..8.min(self.token.len())],
            self.action,
            self.amount,
            self.value_sol,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_action_parses_case_insensitively() {
        assert_eq!(TradeAction::from_api_str("buy"), Some(TradeAction::Buy));
        assert_eq!(TradeAction::from_api_str("SELL"), Some(TradeAction::Sell));
        assert_eq!(TradeAction::from_api_str("mint"), None);
    }
}
