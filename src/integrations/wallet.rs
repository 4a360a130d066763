use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    constants::WALLET_USER_REJECTED_CODE,
    error::{AppError, Result},
};

/// A connected wallet that can sign and broadcast on the user's behalf.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Wallet reached through an HTTP bridge speaking `{method, params}` JSON-RPC.
#[derive(Clone, Debug)]
pub struct WalletBridgeClient {
    base_url: String,
    client: Client,
}

impl WalletBridgeClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

#[async_trait::async_trait]
impl WalletProvider for WalletBridgeClient {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        if !self.is_configured() {
            return Err(AppError::NotConnected);
        }

        let url = format!("{}/rpc", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .json(&json!({ "method": method, "params": params }))
            .send()
            .await?;

        let status = resp.status();
        let payload: Value = resp.json().await.unwrap_or(Value::Null);
        if let Some(error) = payload.get("error") {
            return Err(wallet_error(error));
        }
        if !status.is_success() {
            return Err(AppError::HttpError {
                status: status.as_u16(),
                body: payload.to_string(),
            });
        }

        Ok(payload.get("result").cloned().unwrap_or(payload))
    }
}

// Node-side rejections ("transaction rejected") are real failures.
fn is_user_rejection(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("cancel")
        || ["user rejected", "user denied", "rejected by user", "denied by user"]
            .iter()
            .any(|phrase| lower.contains(phrase))
}

/// Maps a wallet error object; a user rejection is not a failure.
pub fn wallet_error(error: &Value) -> AppError {
    let code = error.get("code").and_then(Value::as_i64);
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .unwrap_or("wallet request failed")
        .to_string();

    if code == Some(WALLET_USER_REJECTED_CODE) || is_user_rejection(&message) {
        AppError::UserCancelled
    } else {
        AppError::Wallet(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_code_is_user_cancelled() {
        let err = wallet_error(&json!({ "code": 4001, "message": "nope" }));
        assert!(matches!(err, AppError::UserCancelled));
    }

    #[test]
    fn cancel_message_is_user_cancelled() {
        // Memastikan pesan "cancel" dianggap pembatalan oleh user
        let err = wallet_error(&json!({ "code": -32000, "message": "User canceled the request" }));
        assert!(matches!(err, AppError::UserCancelled));
        let err = wallet_error(&json!("User rejected the request"));
        assert!(matches!(err, AppError::UserCancelled));
        let err = wallet_error(&json!({ "message": "Signature denied by user" }));
        assert!(matches!(err, AppError::UserCancelled));
    }

    #[test]
    fn other_errors_keep_message() {
        let err = wallet_error(&json!({ "code": -32603, "message": "insufficient funds" }));
        match err {
            AppError::Wallet(message) => assert_eq!(message, "insufficient funds"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn node_rejection_is_a_failure_not_a_cancel() {
        let err = wallet_error(&json!({
            "code": -32603,
            "message": "Broadcast failed: transaction rejected (NotEnoughFunds)"
        }));
        match err {
            AppError::Wallet(message) => assert!(message.contains("NotEnoughFunds")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconfigured_bridge_is_not_connected() {
        let client = WalletBridgeClient::new(String::new());
        assert!(matches!(
            client.request("stx_callContract", json!({})).await,
            Err(AppError::NotConnected)
        ));
    }
}
