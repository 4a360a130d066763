use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    config::Network,
    constants::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT},
    error::Result,
    models::{ApiResponse, TransactionRecord},
    utils::ensure_history_limit,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub network: Option<Network>,
    pub limit: Option<u32>,
}

/// GET /api/v1/history
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionRecord>>>> {
    let (_, services) = state.network(query.network)?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    ensure_history_limit(limit, MAX_HISTORY_LIMIT)?;

    let records = services.history.get_history(limit).await?;
    Ok(Json(ApiResponse::success(records)))
}
