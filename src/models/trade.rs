use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TradeAction;

/// A record of a buy/sell by a watched or tracked wallet. Immutable once
/// created; the aggregator keeps trades newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub token_address: String,
    pub wallet: String,
    /// Display name of the trader when the wallet is explicitly tracked.
    pub display_name: Option<String>,
    /// Resolved from the token collection when the token is known.
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub action: TradeAction,
    pub amount: Decimal,
    pub value_sol: Decimal,
    pub timestamp: DateTime<Utc>,
    pub signature: Option<String>,
}
