use axum::{extract::State, Json};
use serde::Deserialize;

use super::AppState;
use crate::{
    config::Network,
    error::Result,
    models::{ApiResponse, FaucetClaimResponse},
};

#[derive(Debug, Deserialize)]
pub struct FaucetClaimRequest {
    pub address: String,
    pub network: Option<Network>,
}

/// POST /api/v1/faucet/claim
pub async fn claim_stx(
    State(state): State<AppState>,
    Json(req): Json<FaucetClaimRequest>,
) -> Result<Json<ApiResponse<FaucetClaimResponse>>> {
    let network = req.network.unwrap_or(state.config.default_network);
    let claim = state.faucet.claim(network, &req.address).await?;
    Ok(Json(ApiResponse::success(claim)))
}
