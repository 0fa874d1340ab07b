use axum::extract::{Path, State};
use axum::Json;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::Token;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<Token>>> {
    Json(ApiResponse::ok(state.aggregator.tokens()))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<Token>>, AppError> {
    state
        .aggregator
        .tokens()
        .into_iter()
        .find(|t| t.address == address)
        .map(|token| Json(ApiResponse::ok(token)))
        .ok_or_else(|| AppError::NotFound(format!("unknown token {address}")))
}
