use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use trenchsniper::aggregator::Aggregator;
use trenchsniper::api::router::create_router;
use trenchsniper::api::ws_types::{bridge_registry, WsMessage};
use trenchsniper::config::AppConfig;
use trenchsniper::ingestion::feed_listener::run_feed_listener;
use trenchsniper::ingestion::pipeline::run_pipeline;
use trenchsniper::ingestion::server_listener::run_server_listener;
use trenchsniper::metrics::init_metrics;
use trenchsniper::models::IngestEvent;
use trenchsniper::services::notifier::Notifier;
use trenchsniper::services::token_poller::run_token_poller;
use trenchsniper::solana::{HeliusClient, LaunchClient, TransactionHistory};
use trenchsniper::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = init_metrics();

    let notifier = if config.has_telegram() {
        Some(Arc::new(Notifier::new(
            config.telegram_bot_token.clone().unwrap(),
            config.telegram_chat_id.clone().unwrap(),
        )))
    } else {
        tracing::info!("Telegram notifications disabled");
        None
    };

    let history: Arc<dyn TransactionHistory> = Arc::new(HeliusClient::new(
        reqwest::Client::new(),
        config.history_api_url.clone(),
        config.history_api_key.clone(),
    ));

    let aggregator = Arc::new(Aggregator::new(
        config.aggregator_config(),
        history,
        notifier,
    ));
    tracing::info!(
        seed_wallets = config.seed_watched_wallets.len(),
        "Aggregator initialized"
    );

    // --- Dashboard broadcast: registry topics → /ws clients ---
    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);
    bridge_registry(aggregator.registry(), ws_tx.clone());

    // --- Ingest pipeline: transports → aggregator ---
    let (event_tx, event_rx) = mpsc::channel::<IngestEvent>(1000);
    {
        let aggregator = Arc::clone(&aggregator);
        tokio::spawn(async move {
            run_pipeline(event_rx, aggregator).await;
        });
    }

    if config.feed_enabled {
        let ws_url = config.feed_ws_url.clone();
        let account_rx = aggregator.account_keys();
        let token_rx = aggregator.token_keys();
        let tx = event_tx.clone();
        tracing::info!(url = %ws_url, "Starting exchange-feed listener");
        tokio::spawn(async move {
            run_feed_listener(ws_url, account_rx, token_rx, tx).await;
        });
    } else {
        tracing::warn!("Exchange feed disabled (FEED_ENABLED=false)");
    }

    if let Some(server_url) = config.server_ws_url.clone() {
        let tx = event_tx.clone();
        tracing::info!(url = %server_url, "Starting application-server listener");
        tokio::spawn(async move {
            run_server_listener(server_url, tx).await;
        });
    }

    if config.token_poller_enabled {
        let launch_client =
            LaunchClient::new(reqwest::Client::new(), config.launch_api_url.clone());
        let tx = event_tx.clone();
        let interval_secs = config.token_poll_interval_secs;
        tokio::spawn(async move {
            run_token_poller(launch_client, tx, interval_secs).await;
        });
    }

    // --- HTTP surface ---
    let state = AppState {
        config,
        aggregator,
        ws_tx,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
