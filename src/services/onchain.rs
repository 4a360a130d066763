use serde_json::Value;
use url::Url;

use crate::{
    clarity::DecodeError,
    config::{Config, ContractId, Network},
    error::{AppError, Result},
    models::TxStatus,
};

/// Anything that can answer a read-only contract call.
#[async_trait::async_trait]
pub trait ReadOnlyTransport: Send + Sync {
    async fn call_read_only(&self, function: &str, args: &[String]) -> Result<Value>;
}

/// Stacks node API client bound to one network and one contract.
#[derive(Debug, Clone)]
pub struct ReadOnlyClient {
    network: Network,
    api_url: String,
    contract: ContractId,
    latest_tip: bool,
    client: reqwest::Client,
}

impl ReadOnlyClient {
    pub fn new(network: Network, api_url: String, contract: ContractId, latest_tip: bool) -> Self {
        Self {
            network,
            api_url,
            contract,
            latest_tip,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config, network: Network) -> Result<Self> {
        let contract = config
            .contract_for(network)
            .cloned()
            .ok_or_else(|| AppError::BadRequest(format!("No tip-jar contract configured for {network}")))?;
        Ok(Self::new(
            network,
            config.api_url_for(network).to_string(),
            contract,
            config.read_only_latest_tip,
        ))
    }

    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    fn call_read_url(&self, function: &str) -> Result<Url> {
        let raw = format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.api_url.trim_end_matches('/'),
            self.contract.address,
            self.contract.name,
            function
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid read-only URL {}: {}", raw, e)))?;
        if self.latest_tip {
            url.query_pairs_mut().append_pair("tip", "latest");
        }
        Ok(url)
    }

    fn tx_url(&self, tx_id: &str) -> Result<Url> {
        let raw = format!(
            "{}/extended/v1/tx/{}",
            self.api_url.trim_end_matches('/'),
            normalize_tx_id(tx_id)
        );
        Url::parse(&raw).map_err(|e| AppError::Internal(format!("Invalid tx URL {}: {}", raw, e)))
    }

    /// Look up the confirmation status of a submitted transaction.
    pub async fn get_transaction_status(&self, tx_id: &str) -> Result<TxStatus> {
        let response = self.client.get(self.tx_url(tx_id)?).send().await?;
        let body = read_json_body(response).await?;
        tx_status_from_body(tx_id, &body)
    }
}

#[async_trait::async_trait]
impl ReadOnlyTransport for ReadOnlyClient {
    /// POST a read-only call; the body is returned as-is for the decoder.
    async fn call_read_only(&self, function: &str, args: &[String]) -> Result<Value> {
        let url = self.call_read_url(function)?;
        let body = serde_json::json!({
            "sender": self.contract.address,
            "arguments": args,
        });

        tracing::trace!("read-only call {} on {} ({})", function, self.contract, self.network);
        let response = self.client.post(url).json(&body).send().await?;
        read_json_body(response).await
    }
}

/// Non-2xx becomes `HttpError` with the body text.
pub(crate) async fn read_json_body(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::HttpError {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| AppError::NetworkFailure(format!("Invalid JSON body: {}", e)))
}

fn normalize_tx_id(tx_id: &str) -> String {
    let trimmed = tx_id.trim();
    if trimmed.starts_with("0x") {
        trimmed.to_string()
    } else {
        format!("0x{trimmed}")
    }
}

// The extended API returns fee_rate as a string and block_height as a number.
fn json_u128(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn tx_status_from_body(tx_id: &str, body: &Value) -> Result<TxStatus> {
    let status = body
        .get("tx_status")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::InvalidFormat("tx response has no tx_status".to_string()))?;

    Ok(TxStatus {
        tx_id: normalize_tx_id(tx_id),
        status: status.to_string(),
        confirmed: status == "success",
        block_height: body.get("block_height").and_then(Value::as_u64),
        fee: body.get("fee_rate").and_then(json_u128),
    })
}
