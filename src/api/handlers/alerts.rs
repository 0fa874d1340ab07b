use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::models::Alert;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<Alert>>> {
    Json(ApiResponse::ok(state.aggregator.alerts()))
}
