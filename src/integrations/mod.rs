pub mod wallet;

pub use wallet::{WalletBridgeClient, WalletProvider};
