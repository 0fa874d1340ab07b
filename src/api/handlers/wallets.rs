use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::TrackedWallet;
use crate::AppState;

#[derive(Deserialize)]
pub struct TrackRequest {
    pub address: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<TrackedWallet>>> {
    Json(ApiResponse::ok(state.aggregator.tracked_wallets()))
}

pub async fn top(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::ok(state.aggregator.top_wallets()))
}

pub async fn track(
    State(state): State<AppState>,
    Json(body): Json<TrackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<TrackedWallet>>>), AppError> {
    let tracked = state
        .aggregator
        .track_wallet(&body.address, body.display_name.as_deref())
        .await;

    if !tracked {
        return Err(AppError::BadRequest(
            "address is invalid or already tracked".into(),
        ));
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(state.aggregator.tracked_wallets())),
    ))
}

pub async fn untrack(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<Vec<TrackedWallet>>>, AppError> {
    if !state.aggregator.remove_tracked_wallet(&address) {
        return Err(AppError::NotFound(format!("{address} is not tracked")));
    }

    Ok(Json(ApiResponse::ok(state.aggregator.tracked_wallets())))
}

/// Trigger one wallet-activity check outside the polling schedule.
pub async fn check_now(State(state): State<AppState>) -> StatusCode {
    state.aggregator.check_tracked_wallets().await;
    StatusCode::ACCEPTED
}
