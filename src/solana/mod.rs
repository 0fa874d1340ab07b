pub mod address;
pub mod history_client;
pub mod launch_client;

pub use history_client::{HeliusClient, HistoryError, TransactionHistory, WalletTransaction};
pub use launch_client::LaunchClient;
