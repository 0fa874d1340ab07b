use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// One enriched transaction returned by the history API.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletTransaction {
    #[serde(default)]
    pub signature: Option<String>,
    /// Epoch seconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default, rename = "tokenTransfers")]
    pub token_transfers: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenTransfer {
    pub mint: String,
    #[serde(default, rename = "fromUserAccount")]
    pub from_user_account: Option<String>,
    #[serde(default, rename = "toUserAccount")]
    pub to_user_account: Option<String>,
    #[serde(default, rename = "tokenAmount")]
    pub token_amount: Option<Decimal>,
}

impl WalletTransaction {
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(|s| DateTime::from_timestamp(s, 0))
    }
}

/// Transaction-history collaborator: address + since-timestamp → ordered
/// transactions with token-transfer sub-records. Behind a trait so the
/// wallet-polling path is testable without a network.
#[async_trait]
pub trait TransactionHistory: Send + Sync {
    async fn transactions_since(
        &self,
        address: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<WalletTransaction>, HistoryError>;
}

/// Helius enhanced-transactions API client.
#[derive(Debug, Clone)]
pub struct HeliusClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HeliusClient {
    pub fn new(http: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl TransactionHistory for HeliusClient {
    async fn transactions_since(
        &self,
        address: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<WalletTransaction>, HistoryError> {
        let url = format!("{}/v0/addresses/{}/transactions", self.base_url, address);

        let mut req = self.http.get(&url);
        if let Some(key) = &self.api_key {
            req = req.query(&[("api-key", key.as_str())]);
        }

        let resp = req.send().await?.error_for_status()?;
        let transactions: Vec<WalletTransaction> = resp.json().await?;

        // The API returns newest-first without a since filter; drop anything
        // at or before the cutoff here.
        Ok(transactions
            .into_iter()
            .filter(|tx| tx.occurred_at().map(|t| t > since).unwrap_or(false))
            .collect())
    }
}
