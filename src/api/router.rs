use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes — require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Dashboard
        .route("/api/dashboard/summary", get(handlers::dashboard::summary))
        // Feeds
        .route("/api/alerts", get(handlers::alerts::list))
        .route("/api/tokens", get(handlers::tokens::list))
        .route("/api/tokens/:address", get(handlers::tokens::detail))
        .route("/api/trades", get(handlers::trades::list))
        // Wallet tracking
        .route("/api/wallets", get(handlers::wallets::list).post(handlers::wallets::track))
        .route("/api/wallets/top", get(handlers::wallets::top))
        .route("/api/wallets/:address", delete(handlers::wallets::untrack))
        .route("/api/wallets/check", post(handlers::wallets::check_now))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn(require_auth));

    // CORS: allow same-origin + common dashboard origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
