use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clarity::Principal;

/// Aggregate of the tip-jar contract's read-only getters. Amounts in micro-STX.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CachedContractSnapshot {
    pub balance_micro_stx: u128,
    pub total_tips_micro_stx: u128,
    pub total_tippers: u128,
    pub total_transactions: u128,
    pub owner: Option<Principal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_stats: Option<TipperStats>,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TipperStats {
    pub total_tipped_micro_stx: u128,
    pub tip_count: u128,
    pub last_tip_block: u128,
    pub is_premium: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub tx_id: u128,
    pub tipper: Option<Principal>,
    pub amount_micro_stx: u128,
    pub block_height: u128,
    pub timestamp: u128,
    pub has_message: bool,
}

/// Status of a submitted transaction as reported by the extended API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxStatus {
    pub tx_id: String,
    pub status: String,
    pub confirmed: bool,
    pub block_height: Option<u64>,
    pub fee: Option<u128>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TipReceipt {
    pub tx_id: String,
    pub amount_micro_stx: u128,
    pub amount_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaucetClaimResponse {
    pub address: String,
    pub tx_id: String,
}

/// Previously connected wallet, persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWallet {
    pub address: String,
    pub wallet_type: String,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
