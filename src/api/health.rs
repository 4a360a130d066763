use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::config::Network;

#[derive(Serialize)]
pub struct NetworkHealth {
    pub network: Network,
    pub contract: String,
    pub pending_requests: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub default_network: Network,
    pub networks: Vec<NetworkHealth>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut networks: Vec<NetworkHealth> = state
        .networks
        .iter()
        .map(|(network, services)| NetworkHealth {
            network: *network,
            contract: services.client.contract().to_string(),
            pending_requests: services.queue.pending(),
        })
        .collect();
    networks.sort_by_key(|n| n.network.as_str());

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_network: state.config.default_network,
        networks,
    })
}
