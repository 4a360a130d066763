use serde_json::Value;
use url::Url;

use crate::{
    config::{Config, Network},
    error::{AppError, Result},
    models::FaucetClaimResponse,
};

fn faucet_url(base: &str, address: &str) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| AppError::Internal(format!("Invalid faucet URL {}: {}", base, e)))?;
    url.query_pairs_mut()
        .append_pair("address", address)
        .append_pair("stacking", "false");
    Ok(url)
}

fn map_faucet_status(status: u16, body: String) -> AppError {
    match status {
        429 => AppError::RateLimitExceeded,
        500 => AppError::ServiceUnavailable,
        _ => AppError::HttpError { status, body },
    }
}

// The faucet has answered with both spellings.
fn tx_id_from_body(body: &Value) -> Option<String> {
    body.get("txId")
        .or_else(|| body.get("txid"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Testnet STX faucet client.
pub struct FaucetClient {
    faucet_url: String,
    client: reqwest::Client,
}

impl FaucetClient {
    pub fn new(faucet_url: String) -> Self {
        Self {
            faucet_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.faucet_api_url.clone())
    }

    pub async fn claim(&self, network: Network, address: &str) -> Result<FaucetClaimResponse> {
        if network != Network::Testnet {
            return Err(AppError::BadRequest("Faucet only on testnet".to_string()));
        }
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::BadRequest("Address is required".to_string()));
        }

        let url = faucet_url(&self.faucet_url, address)?;
        tracing::info!("Requesting faucet STX for {}", address);
        let response = self.client.post(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Faucet claim for {} failed with {}", address, status);
            return Err(map_faucet_status(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::NetworkFailure(format!("Invalid faucet response: {}", e)))?;
        let tx_id = tx_id_from_body(&body)
            .ok_or_else(|| AppError::Internal("Faucet response has no txId".to_string()))?;

        tracing::info!("Faucet claim for {} submitted: {}", address, tx_id);
        Ok(FaucetClaimResponse {
            address: address.to_string(),
            tx_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn faucet_url_carries_address_and_stacking() {
        let url = faucet_url(
            "https://api.testnet.hiro.so/extended/v1/faucets/stx",
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
        )
        .unwrap();
        assert_eq!(
            url.query(),
            Some("address=ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM&stacking=false")
        );
    }

    #[test]
    fn faucet_status_mapping() {
        // Memastikan status faucet dipetakan ke error yang tepat
        assert!(matches!(map_faucet_status(429, String::new()), AppError::RateLimitExceeded));
        assert!(matches!(map_faucet_status(500, String::new()), AppError::ServiceUnavailable));
        assert!(matches!(
            map_faucet_status(400, "bad address".into()),
            AppError::HttpError { status: 400, .. }
        ));
    }

    #[test]
    fn tx_id_accepts_both_spellings() {
        assert_eq!(tx_id_from_body(&json!({ "txId": "0xaa" })).as_deref(), Some("0xaa"));
        assert_eq!(tx_id_from_body(&json!({ "txid": "0xbb" })).as_deref(), Some("0xbb"));
        assert_eq!(tx_id_from_body(&json!({ "success": true })), None);
    }

    #[tokio::test]
    async fn mainnet_claim_is_rejected_before_any_request() {
        let client = FaucetClient::new("http://127.0.0.1:9/unreachable".to_string());
        let err = client
            .claim(Network::Mainnet, "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
