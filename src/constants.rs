/// Application constants

// Contract read-only functions
pub const FN_GET_CONTRACT_BALANCE: &str = "get-contract-balance";
pub const FN_GET_TOTAL_TIPS: &str = "get-total-tips";
pub const FN_GET_TOTAL_TIPPERS: &str = "get-total-tippers";
pub const FN_GET_TOTAL_TRANSACTIONS: &str = "get-total-transactions";
pub const FN_GET_OWNER: &str = "get-owner";
pub const FN_GET_TIPPER_STATS: &str = "get-tipper-stats";
pub const FN_IS_PREMIUM_TIPPER: &str = "is-premium-tipper";
pub const FN_GET_TRANSACTION: &str = "get-transaction";

// Contract public functions
pub const FN_SEND_TIP: &str = "send-tip";

// Stacks API endpoints
pub const DEFAULT_STACKS_API_MAINNET: &str = "https://api.mainnet.hiro.so";
pub const DEFAULT_STACKS_API_TESTNET: &str = "https://api.testnet.hiro.so";
pub const DEFAULT_FAUCET_API_URL: &str = "https://api.testnet.hiro.so/extended/v1/faucets/stx";

// Cache / request pacing
pub const CACHE_TTL_MS: u64 = 5_000;
pub const REQUEST_DELAY_MS: u64 = 200;
pub const REQUEST_TIMEOUT_MS: u64 = 15_000;
pub const QUEUE_DEPTH_WARN: usize = 25;

// History
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;
pub const MAX_HISTORY_LIMIT: u32 = 50;

// Units
pub const MICRO_STX_PER_STX: u128 = 1_000_000;
pub const STX_DECIMALS: u32 = 6;
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 4;

// Wallet
pub const WALLET_SESSION_TTL_HOURS: i64 = 24;
pub const DEFAULT_WALLET_SESSION_PATH: &str = "wallet-session.json";
pub const WALLET_USER_REJECTED_CODE: i64 = 4001;

// API version
pub const API_VERSION: &str = "v1";
