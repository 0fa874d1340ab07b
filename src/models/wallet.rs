use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-requested watch entry. `address` is the unique key; the activity
/// poller bumps `last_checked` every cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedWallet {
    pub address: String,
    pub display_name: String,
    pub last_checked: DateTime<Utc>,
}
