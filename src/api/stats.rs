use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{
    config::Network,
    error::{AppError, Result},
    models::{ApiResponse, CachedContractSnapshot},
    utils::format_stx,
};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub network: Option<Network>,
    pub user: Option<String>,
    pub force: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub network: Network,
    #[serde(flatten)]
    pub snapshot: CachedContractSnapshot,
    pub balance_display: String,
    pub total_tips_display: String,
}

fn stats_response(network: Network, snapshot: CachedContractSnapshot, decimals: u32) -> StatsResponse {
    StatsResponse {
        network,
        balance_display: format_stx(snapshot.balance_micro_stx, decimals),
        total_tips_display: format_stx(snapshot.total_tips_micro_stx, decimals),
        snapshot,
    }
}

/// GET /api/v1/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<StatsResponse>>> {
    let (network, services) = state.network(query.network)?;
    let user = query
        .user
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    let snapshot = tokio::time::timeout(
        state.config.request_timeout(),
        services.cache.get_snapshot(user, query.force.unwrap_or(false)),
    )
    .await
    .map_err(|_| AppError::NetworkFailure("Timed out reading contract stats".to_string()))??;

    Ok(Json(ApiResponse::success(stats_response(
        network,
        snapshot,
        state.config.display_decimals,
    ))))
}
