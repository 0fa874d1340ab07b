use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::models::Trade;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<Trade>>> {
    Json(ApiResponse::ok(state.aggregator.trades()))
}
