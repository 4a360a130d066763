use axum::{extract::State, Json};
use serde::Deserialize;

use super::AppState;
use crate::{
    config::Network,
    error::{AppError, Result},
    models::{ApiResponse, TipReceipt},
};

#[derive(Debug, Deserialize)]
pub struct TipRequest {
    /// Decimal STX, e.g. "0.5".
    pub amount: String,
    /// Defaults to the stored wallet session.
    pub sender: Option<String>,
    pub network: Option<Network>,
}

/// POST /api/v1/tip
pub async fn send_tip(
    State(state): State<AppState>,
    Json(req): Json<TipRequest>,
) -> Result<Json<ApiResponse<TipReceipt>>> {
    let (network, services) = state.network(req.network)?;

    let sender = match req.sender.filter(|s| !s.trim().is_empty()) {
        Some(sender) => sender,
        None => state
            .sessions
            .load()
            .await?
            .map(|wallet| wallet.address)
            .ok_or(AppError::NotConnected)?,
    };

    let receipt = services.tips.send_tip(&req.amount, &sender).await?;
    // Totals change once the tip lands.
    services.cache.invalidate().await;
    tracing::info!("Tip {} submitted on {}", receipt.tx_id, network);

    Ok(Json(ApiResponse::success(receipt)))
}
