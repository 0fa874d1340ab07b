use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::models::AlertPriority;
use crate::AppState;

#[derive(Serialize)]
pub struct DashboardSummary {
    pub tokens: usize,
    pub trades: usize,
    pub alerts: usize,
    pub high_priority_alerts: usize,
    pub tracked_wallets: usize,
    pub top_wallets: usize,
}

pub async fn summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    let aggregator = &state.aggregator;
    let alerts = aggregator.alerts();
    let high_priority_alerts = alerts
        .iter()
        .filter(|a| a.priority == AlertPriority::High)
        .count();

    Json(DashboardSummary {
        tokens: aggregator.tokens().len(),
        trades: aggregator.trades().len(),
        alerts: alerts.len(),
        high_priority_alerts,
        tracked_wallets: aggregator.tracked_wallets().len(),
        top_wallets: aggregator.top_wallets().len(),
    })
}
