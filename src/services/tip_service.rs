use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    clarity::encode::encode_uint,
    config::{ContractId, Network},
    constants::FN_SEND_TIP,
    error::{AppError, Result},
    integrations::WalletProvider,
    models::TipReceipt,
    utils::{format_stx, parse_stx_amount},
};

const METHOD_CALL_CONTRACT: &str = "stx_callContract";

fn call_contract_params(
    contract: &ContractId,
    network: Network,
    sender: &str,
    amount_micro_stx: u128,
) -> Value {
    json!({
        "contract": contract.to_string(),
        "functionName": FN_SEND_TIP,
        "functionArgs": [encode_uint(amount_micro_stx)],
        "network": network.as_str(),
        "address": sender,
    })
}

fn tx_id_from_result(result: &Value) -> Option<String> {
    match result {
        Value::String(tx_id) => Some(tx_id.clone()),
        other => other
            .get("txid")
            .or_else(|| other.get("txId"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Submits `send-tip` through the user's wallet.
pub struct TipService {
    provider: Option<Arc<dyn WalletProvider>>,
    contract: ContractId,
    network: Network,
    display_decimals: u32,
}

impl TipService {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        contract: ContractId,
        network: Network,
        display_decimals: u32,
    ) -> Self {
        Self {
            provider,
            contract,
            network,
            display_decimals,
        }
    }

    pub async fn send_tip(&self, amount_stx: &str, sender: &str) -> Result<TipReceipt> {
        let amount_micro_stx = parse_stx_amount(amount_stx)?;
        let provider = self.provider.as_ref().ok_or(AppError::NotConnected)?;
        if sender.trim().is_empty() {
            return Err(AppError::NotConnected);
        }

        let params = call_contract_params(&self.contract, self.network, sender.trim(), amount_micro_stx);
        tracing::info!(
            "Submitting {} of {} micro-STX to {} from {}",
            FN_SEND_TIP,
            amount_micro_stx,
            self.contract,
            sender
        );

        let result = match provider.request(METHOD_CALL_CONTRACT, params).await {
            Ok(result) => result,
            Err(AppError::UserCancelled) => {
                tracing::info!("Tip from {} cancelled in wallet", sender);
                return Err(AppError::UserCancelled);
            }
            Err(err) => {
                tracing::warn!("Tip from {} failed: {}", sender, err);
                return Err(err);
            }
        };

        let tx_id = tx_id_from_result(&result)
            .ok_or_else(|| AppError::Wallet("wallet returned no txid".to_string()))?;
        Ok(TipReceipt {
            tx_id,
            amount_micro_stx,
            amount_display: format_stx(amount_micro_stx, self.display_decimals),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const SENDER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    struct FakeWallet {
        reply: fn() -> Result<Value>,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl FakeWallet {
        fn new(reply: fn() -> Result<Value>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl WalletProvider for FakeWallet {
        async fn request(&self, method: &str, params: Value) -> Result<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            (self.reply)()
        }
    }

    fn service(provider: Option<Arc<dyn WalletProvider>>) -> TipService {
        TipService::new(
            provider,
            ContractId::parse("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.tip-jar").unwrap(),
            Network::Testnet,
            4,
        )
    }

    #[tokio::test]
    async fn send_tip_calls_contract_with_encoded_amount() {
        let wallet = FakeWallet::new(|| Ok(json!({ "txid": "0xfeed" })));
        let receipt = service(Some(wallet.clone())).send_tip("1.5", SENDER).await.unwrap();

        assert_eq!(receipt.tx_id, "0xfeed");
        assert_eq!(receipt.amount_micro_stx, 1_500_000);
        assert_eq!(receipt.amount_display, "1.5000 STX");

        let requests = wallet.requests.lock().unwrap();
        let (method, params) = &requests[0];
        assert_eq!(method, "stx_callContract");
        assert_eq!(params["contract"], "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.tip-jar");
        assert_eq!(params["functionName"], "send-tip");
        assert_eq!(params["functionArgs"][0], encode_uint(1_500_000));
        assert_eq!(params["address"], SENDER);
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_wallet() {
        let wallet = FakeWallet::new(|| Ok(json!("0xfeed")));
        let err = service(Some(wallet.clone())).send_tip("0", SENDER).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(_)));
        assert!(wallet.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_wallet_is_not_connected() {
        let err = service(None).send_tip("1", SENDER).await.unwrap_err();
        assert!(matches!(err, AppError::NotConnected));
    }

    #[tokio::test]
    async fn cancellation_is_distinguished_from_failure() {
        // Memastikan pembatalan user berbeda dari kegagalan
        let cancelled = FakeWallet::new(|| Err(AppError::UserCancelled));
        let err = service(Some(cancelled)).send_tip("1", SENDER).await.unwrap_err();
        assert!(matches!(err, AppError::UserCancelled));

        let failed = FakeWallet::new(|| Err(AppError::Wallet("broadcast failed".into())));
        let err = service(Some(failed)).send_tip("1", SENDER).await.unwrap_err();
        assert!(matches!(err, AppError::Wallet(_)));
    }

    #[test]
    fn tx_id_from_string_or_object() {
        assert_eq!(tx_id_from_result(&json!("0x01")).as_deref(), Some("0x01"));
        assert_eq!(tx_id_from_result(&json!({ "txId": "0x02" })).as_deref(), Some("0x02"));
        assert_eq!(tx_id_from_result(&json!({})), None);
    }
}
