use axum::{extract::State, Json};
use serde::Deserialize;

use super::AppState;
use crate::{
    crypto::c32::c32_address_decode,
    error::{AppError, Result},
    models::{ApiResponse, StoredWallet},
};

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub address: String,
    pub wallet_type: String,
}

/// GET /api/v1/session
pub async fn get_session(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Option<StoredWallet>>>> {
    let wallet = state.sessions.load().await?;
    Ok(Json(ApiResponse::success(wallet)))
}

/// POST /api/v1/session
pub async fn connect(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ApiResponse<StoredWallet>>> {
    c32_address_decode(req.address.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid Stacks address: {e}")))?;
    if req.wallet_type.trim().is_empty() {
        return Err(AppError::BadRequest("wallet_type is required".to_string()));
    }
    let wallet = state.sessions.save(&req.address, &req.wallet_type).await?;
    Ok(Json(ApiResponse::success(wallet)))
}

/// DELETE /api/v1/session
pub async fn disconnect(State(state): State<AppState>) -> Result<Json<ApiResponse<bool>>> {
    state.sessions.clear().await?;
    Ok(Json(ApiResponse::success(true)))
}
