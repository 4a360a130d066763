use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    CACHE_TTL_MS, DEFAULT_DISPLAY_DECIMALS, DEFAULT_FAUCET_API_URL, DEFAULT_STACKS_API_MAINNET,
    DEFAULT_STACKS_API_TESTNET, DEFAULT_WALLET_SESSION_PATH, REQUEST_DELAY_MS,
    REQUEST_TIMEOUT_MS, STX_DECIMALS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => anyhow::bail!("Unknown Stacks network: {}", other),
        }
    }
}

/// Fully qualified contract identifier (`ADDRESS.contract-name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractId {
    pub address: String,
    pub name: String,
}

impl ContractId {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        let (address, name) = value
            .trim()
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Contract id must be ADDRESS.name, got {}", value))?;
        if address.is_empty() || name.is_empty() {
            anyhow::bail!("Contract id must be ADDRESS.name, got {}", value);
        }
        Ok(Self {
            address: address.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Blockchain
    pub default_network: Network,
    pub stacks_api_url_mainnet: String,
    pub stacks_api_url_testnet: String,
    pub contract_mainnet: Option<ContractId>,
    pub contract_testnet: Option<ContractId>,
    pub read_only_latest_tip: bool,

    // Cache / pacing
    pub cache_ttl_ms: u64,
    pub request_delay_ms: u64,
    pub request_timeout_ms: u64,

    // Faucet
    pub faucet_api_url: String,

    // Display
    pub display_decimals: u32,

    // Wallet
    pub wallet_bridge_url: Option<String>,
    pub wallet_session_path: String,

    // CORS
    pub cors_allowed_origins: String,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "y" | "on"
            )
        })
        .unwrap_or(default)
}

fn optional_contract(name: &str) -> anyhow::Result<Option<ContractId>> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(ContractId::parse(&value)?)),
        _ => Ok(None),
    }
}

fn optional_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            default_network: env::var("STACKS_NETWORK")
                .unwrap_or_else(|_| "testnet".to_string())
                .parse()?,
            stacks_api_url_mainnet: env::var("STACKS_API_URL_MAINNET")
                .unwrap_or_else(|_| DEFAULT_STACKS_API_MAINNET.to_string()),
            stacks_api_url_testnet: env::var("STACKS_API_URL_TESTNET")
                .unwrap_or_else(|_| DEFAULT_STACKS_API_TESTNET.to_string()),
            contract_mainnet: optional_contract("TIPJAR_CONTRACT_MAINNET")?,
            contract_testnet: optional_contract("TIPJAR_CONTRACT_TESTNET")?,
            read_only_latest_tip: env_flag("READ_ONLY_LATEST_TIP", true),

            cache_ttl_ms: env::var("CACHE_TTL_MS")
                .unwrap_or_else(|_| CACHE_TTL_MS.to_string())
                .parse()?,
            request_delay_ms: env::var("REQUEST_DELAY_MS")
                .unwrap_or_else(|_| REQUEST_DELAY_MS.to_string())
                .parse()?,
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| REQUEST_TIMEOUT_MS.to_string())
                .parse()?,

            faucet_api_url: env::var("FAUCET_API_URL")
                .unwrap_or_else(|_| DEFAULT_FAUCET_API_URL.to_string()),

            display_decimals: env::var("DISPLAY_DECIMALS")
                .unwrap_or_else(|_| DEFAULT_DISPLAY_DECIMALS.to_string())
                .parse()?,

            wallet_bridge_url: optional_string("WALLET_BRIDGE_URL"),
            wallet_session_path: env::var("WALLET_SESSION_PATH")
                .unwrap_or_else(|_| DEFAULT_WALLET_SESSION_PATH.to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.contract_mainnet.is_none() && self.contract_testnet.is_none() {
            anyhow::bail!("Neither TIPJAR_CONTRACT_MAINNET nor TIPJAR_CONTRACT_TESTNET is set");
        }
        if self.contract_for(self.default_network).is_none() {
            anyhow::bail!(
                "STACKS_NETWORK={} but no contract is configured for it",
                self.default_network
            );
        }
        for url in [&self.stacks_api_url_mainnet, &self.stacks_api_url_testnet] {
            url::Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid Stacks API URL {}: {}", url, e))?;
        }
        if self.display_decimals > STX_DECIMALS {
            anyhow::bail!(
                "DISPLAY_DECIMALS must be between 0 and {}, got {}",
                STX_DECIMALS,
                self.display_decimals
            );
        }
        if self.cache_ttl_ms == 0 {
            tracing::warn!("CACHE_TTL_MS is 0; every snapshot read will hit the network");
        }
        if self.request_delay_ms == 0 {
            tracing::warn!("REQUEST_DELAY_MS is 0; upstream may rate-limit bursts");
        }
        if self.wallet_bridge_url.is_none() {
            tracing::warn!("WALLET_BRIDGE_URL not set; tip submission is disabled");
        }
        if let Some(contract) = &self.contract_testnet {
            if !contract.address.starts_with("ST") {
                tracing::warn!("Testnet contract {} does not use an ST address", contract);
            }
        }
        if let Some(contract) = &self.contract_mainnet {
            if !contract.address.starts_with("SP") {
                tracing::warn!("Mainnet contract {} does not use an SP address", contract);
            }
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        self.default_network == Network::Testnet
    }

    pub fn api_url_for(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.stacks_api_url_mainnet,
            Network::Testnet => &self.stacks_api_url_testnet,
        }
    }

    pub fn contract_for(&self, network: Network) -> Option<&ContractId> {
        match network {
            Network::Mainnet => self.contract_mainnet.as_ref(),
            Network::Testnet => self.contract_testnet.as_ref(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
pub(crate) fn sample_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "testnet".to_string(),
        default_network: Network::Testnet,
        stacks_api_url_mainnet: DEFAULT_STACKS_API_MAINNET.to_string(),
        stacks_api_url_testnet: DEFAULT_STACKS_API_TESTNET.to_string(),
        contract_mainnet: None,
        contract_testnet: Some(ContractId {
            address: "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".to_string(),
            name: "tip-jar".to_string(),
        }),
        read_only_latest_tip: true,
        cache_ttl_ms: CACHE_TTL_MS,
        request_delay_ms: REQUEST_DELAY_MS,
        request_timeout_ms: REQUEST_TIMEOUT_MS,
        faucet_api_url: DEFAULT_FAUCET_API_URL.to_string(),
        display_decimals: DEFAULT_DISPLAY_DECIMALS,
        wallet_bridge_url: None,
        wallet_session_path: DEFAULT_WALLET_SESSION_PATH.to_string(),
        cors_allowed_origins: "*".to_string(),
    }
}
