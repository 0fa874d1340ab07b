use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked tradable asset. `address` (the mint) is the unique key within
/// the token collection; counters only ever increase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: Uuid,
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    pub creator: Option<String>,
    pub is_creator_watched: bool,
    pub trade_count: u64,
    pub top_trader_buys: u64,
    pub market_cap_sol: Option<Decimal>,
    pub liquidity_sol: Option<Decimal>,
    pub price_sol: Option<Decimal>,
}
