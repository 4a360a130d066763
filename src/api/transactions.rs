use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    config::Network,
    error::{AppError, Result},
    models::{ApiResponse, TxStatus},
};

#[derive(Debug, Deserialize)]
pub struct NetworkQuery {
    pub network: Option<Network>,
}

fn is_tx_id(tx_id: &str) -> bool {
    let hex = tx_id.trim().trim_start_matches("0x");
    hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// GET /api/v1/tx/{tx_id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(tx_id): Path<String>,
    Query(query): Query<NetworkQuery>,
) -> Result<Json<ApiResponse<TxStatus>>> {
    if !is_tx_id(&tx_id) {
        return Err(AppError::BadRequest(format!("Invalid transaction id {tx_id}")));
    }
    let (_, services) = state.network(query.network)?;
    let status = match services.client.get_transaction_status(&tx_id).await {
        Err(AppError::HttpError { status: 404, .. }) => {
            return Err(AppError::NotFound(format!("Transaction {tx_id}")))
        }
        other => other?,
    };
    Ok(Json(ApiResponse::success(status)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_id_must_be_32_bytes_hex() {
        let id = "ab".repeat(32);
        assert!(is_tx_id(&id));
        assert!(is_tx_id(&format!("0x{id}")));
        assert!(!is_tx_id("0x1234"));
        assert!(!is_tx_id(&"zz".repeat(32)));
    }
}
