pub mod aggregator;
pub mod api;
pub mod config;
pub mod errors;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod services;
pub mod solana;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::aggregator::Aggregator;
use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub aggregator: Arc<Aggregator>,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
