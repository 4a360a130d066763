use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;

use crate::{constants::WALLET_SESSION_TTL_HOURS, error::Result, models::StoredWallet};

/// Last connected wallet, persisted as a small JSON file.
pub struct WalletSessionStore {
    path: PathBuf,
    ttl: Duration,
}

impl WalletSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::hours(WALLET_SESSION_TTL_HOURS),
        }
    }

    pub async fn save(&self, address: &str, wallet_type: &str) -> Result<StoredWallet> {
        let wallet = StoredWallet {
            address: address.trim().to_string(),
            wallet_type: wallet_type.trim().to_string(),
            connected_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&wallet)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::info!("Wallet session saved for {}", wallet.address);
        Ok(wallet)
    }

    /// Expired or unreadable sessions are removed and yield `None`.
    pub async fn load(&self) -> Result<Option<StoredWallet>> {
        self.load_at(Utc::now()).await
    }

    async fn load_at(&self, now: DateTime<Utc>) -> Result<Option<StoredWallet>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let wallet: StoredWallet = match serde_json::from_slice(&raw) {
            Ok(wallet) => wallet,
            Err(err) => {
                tracing::warn!("Discarding unreadable wallet session: {}", err);
                self.clear().await?;
                return Ok(None);
            }
        };

        if now - wallet.connected_at > self.ttl {
            tracing::info!("Wallet session for {} expired", wallet.address);
            self.clear().await?;
            return Ok(None);
        }
        Ok(Some(wallet))
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
