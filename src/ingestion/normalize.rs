//! Translation of the two external wire shapes into normalized ingest
//! events. Unknown or malformed frames map to `None` and are dropped by the
//! listeners with a logged warning; nothing here retries or buffers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{IngestEvent, NewTokenEvent, TradeAction, TradeEvent};

// ---------------------------------------------------------------------------
// Exchange feed — pump.fun-style txType frames
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeedFrame {
    #[serde(alias = "txType")]
    tx_type: Option<String>,
    mint: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    #[serde(alias = "traderPublicKey")]
    trader_public_key: Option<String>,
    #[serde(alias = "tokenAmount")]
    token_amount: Option<Decimal>,
    #[serde(alias = "initialBuy")]
    initial_buy: Option<Decimal>,
    #[serde(alias = "solAmount")]
    sol_amount: Option<Decimal>,
    #[serde(alias = "marketCapSol")]
    market_cap_sol: Option<Decimal>,
    #[serde(alias = "vSolInBondingCurve")]
    v_sol_in_bonding_curve: Option<Decimal>,
    signature: Option<String>,
    timestamp: Option<serde_json::Value>,
}

/// Parse one exchange-feed frame. `create` frames become token events,
/// `buy`/`sell` frames become trade events; anything else (subscription
/// acks, heartbeats) is not an event.
pub fn normalize_feed_frame(text: &str) -> Option<IngestEvent> {
    let frame: FeedFrame = serde_json::from_str(text).ok()?;
    let tx_type = frame.tx_type.as_deref()?;

    match tx_type {
        "create" => {
            let address = frame.mint?;
            Some(IngestEvent::NewToken(NewTokenEvent {
                address,
                name: frame.name,
                symbol: frame.symbol,
                creator: frame.trader_public_key,
                is_creator_watched: None,
                market_cap_sol: frame.market_cap_sol,
                liquidity_sol: frame.v_sol_in_bonding_curve,
                price_sol: None,
                timestamp: frame.timestamp.as_ref().and_then(parse_timestamp),
            }))
        }
        "buy" | "sell" => {
            let action = TradeAction::from_api_str(tx_type)?;
            let token = frame.mint?;
            let wallet = frame.trader_public_key?;
            Some(IngestEvent::Trade(TradeEvent {
                token,
                wallet,
                token_name: frame.name,
                token_symbol: frame.symbol,
                action,
                amount: frame
                    .token_amount
                    .or(frame.initial_buy)
                    .unwrap_or(Decimal::ZERO),
                value_sol: frame.sol_amount.unwrap_or(Decimal::ZERO),
                is_top_buyer: None,
                timestamp: frame.timestamp.as_ref().and_then(parse_timestamp),
                signature: frame.signature,
            }))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Application-server channel — named {event, data} frames
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ServerFrame {
    event: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ServerNewToken {
    address: String,
    name: Option<String>,
    symbol: Option<String>,
    creator: Option<String>,
    #[serde(alias = "isCreatorWatched")]
    is_creator_watched: Option<bool>,
    #[serde(alias = "marketCapSol")]
    market_cap_sol: Option<Decimal>,
    #[serde(alias = "liquiditySol")]
    liquidity_sol: Option<Decimal>,
    #[serde(alias = "priceSol")]
    price_sol: Option<Decimal>,
    timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ServerNewTrade {
    token: String,
    wallet: String,
    #[serde(alias = "tokenName")]
    token_name: Option<String>,
    #[serde(alias = "tokenSymbol")]
    token_symbol: Option<String>,
    action: String,
    amount: Option<Decimal>,
    value: Option<Decimal>,
    #[serde(alias = "isTopBuyer")]
    is_top_buyer: Option<bool>,
    timestamp: Option<serde_json::Value>,
    signature: Option<String>,
}

/// Parse one application-server channel frame.
pub fn normalize_server_frame(text: &str) -> Option<IngestEvent> {
    let frame: ServerFrame = serde_json::from_str(text).ok()?;

    match frame.event.as_str() {
        "newToken" => {
            let raw: ServerNewToken = serde_json::from_value(frame.data).ok()?;
            Some(IngestEvent::NewToken(NewTokenEvent {
                address: raw.address,
                name: raw.name,
                symbol: raw.symbol,
                creator: raw.creator,
                is_creator_watched: raw.is_creator_watched,
                market_cap_sol: raw.market_cap_sol,
                liquidity_sol: raw.liquidity_sol,
                price_sol: raw.price_sol,
                timestamp: raw.timestamp.as_ref().and_then(parse_timestamp),
            }))
        }
        "newTrade" => {
            let raw: ServerNewTrade = serde_json::from_value(frame.data).ok()?;
            let action = TradeAction::from_api_str(&raw.action)?;
            Some(IngestEvent::Trade(TradeEvent {
                token: raw.token,
                wallet: raw.wallet,
                token_name: raw.token_name,
                token_symbol: raw.token_symbol,
                action,
                amount: raw.amount.unwrap_or(Decimal::ZERO),
                value_sol: raw.value.unwrap_or(Decimal::ZERO),
                is_top_buyer: raw.is_top_buyer,
                timestamp: raw.timestamp.as_ref().and_then(parse_timestamp),
                signature: raw.signature,
            }))
        }
        "topWallets" => {
            let wallets: Vec<String> = serde_json::from_value(frame.data).ok()?;
            Some(IngestEvent::TopWallets(wallets))
        }
        _ => None,
    }
}

/// Timestamps arrive as epoch seconds, epoch milliseconds, or RFC 3339
/// strings depending on the transport.
fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => {
            let raw = n.as_i64()?;
            from_epoch(raw)
        }
        serde_json::Value::String(s) => {
            if let Ok(raw) = s.parse::<i64>() {
                return from_epoch(raw);
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn from_epoch(raw: i64) -> Option<DateTime<Utc>> {
    // Anything above 1e12 is milliseconds.
    if raw > 1_000_000_000_000 {
        DateTime::from_timestamp(raw / 1000, ((raw % 1000) * 1_000_000) as u32)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}
