// src/models/mod.rs
pub mod tipjar;

pub use tipjar::{
    ApiResponse, CachedContractSnapshot, FaucetClaimResponse, StoredWallet, TipReceipt,
    TipperStats, TransactionRecord, TxStatus,
};
