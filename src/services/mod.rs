pub mod notifier;
pub mod token_poller;
pub mod wallet_poller;
