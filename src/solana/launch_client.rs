use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::models::NewTokenEvent;

#[derive(Debug, Error)]
pub enum LaunchClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One coin row from the launchpad frontend API.
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchedCoin {
    pub mint: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, rename = "created_timestamp")]
    pub created_timestamp: Option<i64>,
    #[serde(default, rename = "market_cap")]
    pub market_cap: Option<Decimal>,
    #[serde(default, rename = "virtual_sol_reserves")]
    pub virtual_sol_reserves: Option<Decimal>,
}

impl LaunchedCoin {
    pub fn into_event(self) -> NewTokenEvent {
        let timestamp = self
            .created_timestamp
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms));

        NewTokenEvent {
            address: self.mint,
            name: self.name,
            symbol: self.symbol,
            creator: self.creator,
            is_creator_watched: None,
            market_cap_sol: self.market_cap,
            liquidity_sol: self.virtual_sol_reserves,
            price_sol: None,
            timestamp,
        }
    }
}

/// Launchpad REST client used by the new-token poller.
#[derive(Debug, Clone)]
pub struct LaunchClient {
    http: Client,
    base_url: String,
}

impl LaunchClient {
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetch the most recently created coins, newest first.
    pub async fn recent_coins(&self, limit: u32) -> Result<Vec<LaunchedCoin>, LaunchClientError> {
        let url = format!("{}/coins", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("sort", "created_timestamp"),
                ("order", "desc"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let coins: Vec<LaunchedCoin> = resp.json().await?;
        Ok(coins)
    }
}
