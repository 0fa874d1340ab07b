use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TopTraderBuy,
    NewToken,
    WalletMovement,
    VolumeSpike,
    TrackedWalletPurchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

/// A transient user-facing notification record. Immutable after creation;
/// the aggregator keeps alerts newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub priority: AlertPriority,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: AlertPriority,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            description: description.into(),
            timestamp: Utc::now(),
            priority,
        }
    }
}
