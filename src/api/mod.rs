// src/api/mod.rs

pub mod faucet;
pub mod health;
pub mod history;
pub mod session;
pub mod stats;
pub mod tip;
pub mod transactions;

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    clarity::ClarityDecoder,
    config::{Config, Network},
    error::{AppError, Result},
    integrations::{WalletBridgeClient, WalletProvider},
    services::{
        ContractDataCache, FaucetClient, HistoryFetcher, ReadOnlyClient, RequestQueue, TipService,
        WalletSessionStore,
    },
};

/// Everything bound to one network's contract. Each network has its own
/// request queue, so pacing is per endpoint.
pub struct NetworkServices {
    pub client: ReadOnlyClient,
    pub queue: RequestQueue,
    pub cache: ContractDataCache,
    pub history: HistoryFetcher,
    pub tips: TipService,
}

impl NetworkServices {
    pub fn build(
        config: &Config,
        network: Network,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Result<Self> {
        let client = ReadOnlyClient::from_config(config, network)?;
        let queue = RequestQueue::new(Arc::new(client.clone()), config.request_delay());
        let decoder = ClarityDecoder::default();

        Ok(Self {
            cache: ContractDataCache::new(queue.clone(), decoder.clone(), config.cache_ttl()),
            history: HistoryFetcher::new(queue.clone(), decoder),
            tips: TipService::new(
                wallet,
                client.contract().clone(),
                network,
                config.display_decimals,
            ),
            client,
            queue,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub networks: Arc<HashMap<Network, NetworkServices>>,
    pub faucet: Arc<FaucetClient>,
    pub sessions: Arc<WalletSessionStore>,
}

impl AppState {
    /// Builds services for every network that has a contract configured.
    /// Spawns the request queue workers, so it must run inside the runtime.
    pub fn from_config(config: Config) -> Result<Self> {
        let wallet: Option<Arc<dyn WalletProvider>> = config
            .wallet_bridge_url
            .clone()
            .map(|url| Arc::new(WalletBridgeClient::new(url)) as Arc<dyn WalletProvider>);

        let mut networks = HashMap::new();
        for network in [Network::Mainnet, Network::Testnet] {
            if config.contract_for(network).is_none() {
                continue;
            }
            let services = NetworkServices::build(&config, network, wallet.clone())?;
            tracing::info!(
                "Tip jar contract {} on {} via {}",
                services.client.contract(),
                network,
                config.api_url_for(network)
            );
            networks.insert(network, services);
        }

        Ok(Self {
            faucet: Arc::new(FaucetClient::from_config(&config)),
            sessions: Arc::new(WalletSessionStore::new(config.wallet_session_path.clone())),
            networks: Arc::new(networks),
            config,
        })
    }

    /// Services for the requested network, falling back to the default one.
    pub fn network(&self, requested: Option<Network>) -> Result<(Network, &NetworkServices)> {
        let network = requested.unwrap_or(self.config.default_network);
        self.networks
            .get(&network)
            .map(|services| (network, services))
            .ok_or_else(|| AppError::BadRequest(format!("No tip jar contract on {network}")))
    }
}
