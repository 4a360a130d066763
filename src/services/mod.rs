// All service modules
pub mod contract_cache;
pub mod faucet_service;
pub mod onchain;
pub mod request_queue;
pub mod tip_service;
pub mod transaction_history;
pub mod wallet_session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for convenience
pub use contract_cache::ContractDataCache;
pub use faucet_service::FaucetClient;
pub use onchain::{ReadOnlyClient, ReadOnlyTransport};
pub use request_queue::RequestQueue;
pub use tip_service::TipService;
pub use transaction_history::HistoryFetcher;
pub use wallet_session::WalletSessionStore;
