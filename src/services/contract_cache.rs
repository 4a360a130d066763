use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use super::request_queue::RequestQueue;
use crate::{
    clarity::{encode::encode_principal, ClarityDecoder, WireValue},
    constants::{
        FN_GET_CONTRACT_BALANCE, FN_GET_OWNER, FN_GET_TIPPER_STATS, FN_GET_TOTAL_TIPPERS,
        FN_GET_TOTAL_TIPS, FN_GET_TOTAL_TRANSACTIONS, FN_IS_PREMIUM_TIPPER,
    },
    error::{AppError, Result},
    models::{CachedContractSnapshot, TipperStats},
};

#[derive(Default)]
struct CacheEntry {
    snapshot: CachedContractSnapshot,
    fetched_at: Option<Instant>,
}

/// Contract Data Cache - short-lived snapshot of the tip-jar getters
pub struct ContractDataCache {
    queue: RequestQueue,
    decoder: ClarityDecoder,
    ttl: Duration,
    entry: RwLock<CacheEntry>,
    refresh_lock: Mutex<()>,
}

impl ContractDataCache {
    pub fn new(queue: RequestQueue, decoder: ClarityDecoder, ttl: Duration) -> Self {
        Self {
            queue,
            decoder,
            ttl,
            entry: RwLock::new(CacheEntry::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns the cached snapshot while it is younger than the TTL, unless a
    /// refresh is forced or per-user stats are requested.
    pub async fn get_snapshot(
        &self,
        user_address: Option<&str>,
        force_refresh: bool,
    ) -> Result<CachedContractSnapshot> {
        let cacheable = !force_refresh && user_address.is_none();
        if cacheable {
            if let Some(snapshot) = self.fresh_snapshot().await {
                tracing::debug!("Contract snapshot cache hit");
                return Ok(snapshot);
            }
        }

        let _guard = self.refresh_lock.lock().await;
        // Someone else may have refreshed while we waited for the lock.
        if cacheable {
            if let Some(snapshot) = self.fresh_snapshot().await {
                return Ok(snapshot);
            }
        }

        self.refresh(user_address).await
    }

    /// Drops freshness; the next read refreshes.
    pub async fn invalidate(&self) {
        self.entry.write().await.fetched_at = None;
    }

    async fn fresh_snapshot(&self) -> Option<CachedContractSnapshot> {
        let entry = self.entry.read().await;
        let fetched_at = entry.fetched_at?;
        if fetched_at.elapsed() < self.ttl {
            Some(entry.snapshot.clone())
        } else {
            None
        }
    }

    async fn refresh(&self, user_address: Option<&str>) -> Result<CachedContractSnapshot> {
        tracing::debug!("Refreshing contract snapshot (user={:?})", user_address);

        let (balance, tips, tippers, transactions, owner) = futures_util::future::join5(
            self.queue.call(FN_GET_CONTRACT_BALANCE, Vec::new()),
            self.queue.call(FN_GET_TOTAL_TIPS, Vec::new()),
            self.queue.call(FN_GET_TOTAL_TIPPERS, Vec::new()),
            self.queue.call(FN_GET_TOTAL_TRANSACTIONS, Vec::new()),
            self.queue.call(FN_GET_OWNER, Vec::new()),
        )
        .await;

        if balance.is_err()
            && tips.is_err()
            && tippers.is_err()
            && transactions.is_err()
            && owner.is_err()
        {
            tracing::warn!("Every contract read failed; keeping previous snapshot");
            return Err(AppError::NetworkFailure(
                "All contract read-only calls failed".to_string(),
            ));
        }

        let user_stats = match user_address {
            Some(address) => self.fetch_user_stats(address).await,
            None => None,
        };

        let snapshot = CachedContractSnapshot {
            balance_micro_stx: self.uint_field(FN_GET_CONTRACT_BALANCE, balance),
            total_tips_micro_stx: self.uint_field(FN_GET_TOTAL_TIPS, tips),
            total_tippers: self.uint_field(FN_GET_TOTAL_TIPPERS, tippers),
            total_transactions: self.uint_field(FN_GET_TOTAL_TRANSACTIONS, transactions),
            owner: match owner {
                Ok(body) => self.decoder.principal_or_none(&body, FN_GET_OWNER),
                Err(err) => {
                    tracing::warn!("{} failed, owner unknown: {}", FN_GET_OWNER, err);
                    None
                }
            },
            user_stats,
            last_update: Some(Utc::now()),
        };

        // Per-user stats are returned to this caller only.
        *self.entry.write().await = CacheEntry {
            snapshot: CachedContractSnapshot {
                user_stats: None,
                ..snapshot.clone()
            },
            fetched_at: Some(Instant::now()),
        };

        tracing::info!(
            "Contract snapshot refreshed: balance={} tips={} tippers={} transactions={}",
            snapshot.balance_micro_stx,
            snapshot.total_tips_micro_stx,
            snapshot.total_tippers,
            snapshot.total_transactions
        );
        Ok(snapshot)
    }

    fn uint_field(&self, function: &str, result: Result<Value>) -> u128 {
        match result {
            Ok(body) => self.decoder.uint_or_default(&body, function),
            Err(err) => {
                tracing::warn!("{} failed, using 0: {}", function, err);
                0
            }
        }
    }

    async fn fetch_user_stats(&self, address: &str) -> Option<TipperStats> {
        let principal = match encode_principal(address) {
            Ok(hex) => hex,
            Err(err) => {
                tracing::warn!("Cannot encode user address {}: {}", address, err);
                return None;
            }
        };

        let (stats, premium) = futures_util::future::join(
            self.queue.call(FN_GET_TIPPER_STATS, vec![principal.clone()]),
            self.queue.call(FN_IS_PREMIUM_TIPPER, vec![principal]),
        )
        .await;

        let (stats, premium) = match (stats, premium) {
            (Ok(stats), Ok(premium)) => (stats, premium),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!("User stats for {} unavailable: {}", address, err);
                return None;
            }
        };

        let is_premium = self.decoder.bool_or_default(&premium, FN_IS_PREMIUM_TIPPER);

        let wire = match self.decoder.wire_result(&stats) {
            Ok(wire) => wire,
            Err(err) => {
                tracing::warn!("{} undecodable for {}: {}", FN_GET_TIPPER_STATS, address, err);
                return None;
            }
        };

        // A principal that never tipped has no stats entry.
        if wire.is_none() {
            return Some(TipperStats {
                is_premium,
                ..TipperStats::default()
            });
        }

        Some(TipperStats {
            total_tipped_micro_stx: stats_field(&wire, "total-tipped"),
            tip_count: stats_field(&wire, "tip-count"),
            last_tip_block: stats_field(&wire, "last-tip-block"),
            is_premium,
        })
    }
}

fn stats_field(wire: &WireValue, name: &str) -> u128 {
    match wire.field(name).map(WireValue::as_uint) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            tracing::warn!("tipper stats field {} undecodable: {}", name, err);
            0
        }
        None => {
            tracing::warn!("tipper stats field {} missing", name);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clarity::{encode::encode_uint, Principal};
    use crate::services::testing::{http_500, ok_body, ok_wrap, some_wrap, tuple_hex, ScriptedTransport};
    use std::sync::Arc;

    const OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const TIPPER: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

    fn standard_responses(function: &str, _args: &[String]) -> Result<Value> {
        match function {
            FN_GET_CONTRACT_BALANCE => ok_body(ok_wrap(&encode_uint(1000))),
            FN_GET_TOTAL_TIPS => ok_body(ok_wrap(&encode_uint(5_000_000))),
            FN_GET_TOTAL_TIPPERS => ok_body(ok_wrap(&encode_uint(3))),
            FN_GET_TOTAL_TRANSACTIONS => ok_body(ok_wrap(&encode_uint(7))),
            FN_GET_OWNER => ok_body(ok_wrap(&encode_principal(OWNER).unwrap())),
            FN_GET_TIPPER_STATS => ok_body(some_wrap(&tuple_hex(&[
                ("total-tipped", encode_uint(2_500_000)),
                ("tip-count", encode_uint(4)),
                ("last-tip-block", encode_uint(150_000)),
            ]))),
            FN_IS_PREMIUM_TIPPER => ok_body(ok_wrap("0x03")),
            _ => http_500(),
        }
    }

    fn cache_with<F>(responder: F) -> (ContractDataCache, Arc<ScriptedTransport>)
    where
        F: Fn(&str, &[String]) -> Result<Value> + Send + Sync + 'static,
    {
        let transport = Arc::new(ScriptedTransport::new(responder));
        let queue = RequestQueue::new(transport.clone(), Duration::ZERO);
        let cache = ContractDataCache::new(
            queue,
            ClarityDecoder::default(),
            Duration::from_millis(5_000),
        );
        (cache, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn second_read_within_ttl_issues_no_calls() {
        let (cache, transport) = cache_with(standard_responses);

        let first = cache.get_snapshot(None, false).await.unwrap();
        assert_eq!(transport.call_count(), 5);
        let second = cache.get_snapshot(None, false).await.unwrap();
        assert_eq!(transport.call_count(), 5);
        assert_eq!(first, second);
        assert_eq!(first.balance_micro_stx, 1000);
        assert_eq!(first.total_tips_micro_stx, 5_000_000);
        assert_eq!(first.total_tippers, 3);
        assert_eq!(first.total_transactions, 7);
        assert_eq!(first.owner, Some(Principal::Address(OWNER.to_string())));
        assert!(first.last_update.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_cold_reads_share_one_refresh() {
        // Memastikan dua pembaca bersamaan hanya memicu satu putaran panggilan
        let (cache, transport) = cache_with(standard_responses);

        let (a, b) = tokio::join!(
            cache.get_snapshot(None, false),
            cache.get_snapshot(None, false)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a, b);
        assert_eq!(transport.call_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_and_force_refresh_issue_full_round() {
        let (cache, transport) = cache_with(standard_responses);

        cache.get_snapshot(None, false).await.unwrap();
        tokio::time::advance(Duration::from_millis(4_999)).await;
        cache.get_snapshot(None, false).await.unwrap();
        assert_eq!(transport.call_count(), 5);

        tokio::time::advance(Duration::from_millis(2)).await;
        cache.get_snapshot(None, false).await.unwrap();
        assert_eq!(transport.call_count(), 10);

        cache.get_snapshot(None, true).await.unwrap();
        assert_eq!(transport.call_count(), 15);

        cache.invalidate().await;
        cache.get_snapshot(None, false).await.unwrap();
        assert_eq!(transport.call_count(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn single_failed_field_degrades_to_default() {
        // Memastikan satu panggilan gagal tidak menggagalkan snapshot
        let (cache, _transport) = cache_with(|function, args| {
            if function == FN_GET_TOTAL_TIPS {
                return http_500();
            }
            standard_responses(function, args)
        });

        let snapshot = cache.get_snapshot(None, false).await.unwrap();
        assert_eq!(snapshot.total_tips_micro_stx, 0);
        assert_eq!(snapshot.balance_micro_stx, 1000);
        assert_eq!(snapshot.total_tippers, 3);
        assert_eq!(snapshot.total_transactions, 7);
        assert!(snapshot.owner.is_some());
        assert!(snapshot.last_update.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_owner_and_garbage_uint_use_defaults() {
        let (cache, _transport) = cache_with(|function, args| match function {
            FN_GET_OWNER => http_500(),
            FN_GET_TOTAL_TIPPERS => ok_body("0xZZZZ".to_string()),
            _ => standard_responses(function, args),
        });

        let snapshot = cache.get_snapshot(None, false).await.unwrap();
        assert!(snapshot.owner.is_none());
        assert_eq!(snapshot.total_tippers, 0);
        assert_eq!(snapshot.balance_micro_stx, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_keeps_previous_snapshot() {
        let (cache, transport) = cache_with(|_, _| http_500());

        assert!(matches!(
            cache.get_snapshot(None, false).await,
            Err(AppError::NetworkFailure(_))
        ));
        assert_eq!(transport.call_count(), 5);
        // nothing was stamped, so the next read tries again
        assert!(cache.get_snapshot(None, false).await.is_err());
        assert_eq!(transport.call_count(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn user_address_fetches_stats_with_principal_argument() {
        let (cache, transport) = cache_with(standard_responses);

        let snapshot = cache.get_snapshot(Some(TIPPER), false).await.unwrap();
        let stats = snapshot.user_stats.expect("user stats present");
        assert_eq!(
            stats,
            TipperStats {
                total_tipped_micro_stx: 2_500_000,
                tip_count: 4,
                last_tip_block: 150_000,
                is_premium: true,
            }
        );

        let calls = transport.calls();
        assert_eq!(calls.len(), 7);
        let expected_arg = encode_principal(TIPPER).unwrap();
        let (function, args) = &calls[5];
        assert_eq!(function, FN_GET_TIPPER_STATS);
        assert_eq!(args, &vec![expected_arg]);

        // user requests always bypass the cache
        cache.get_snapshot(Some(TIPPER), false).await.unwrap();
        assert_eq!(transport.call_count(), 14);

        // the shared snapshot never carries someone's stats
        let shared = cache.get_snapshot(None, false).await.unwrap();
        assert!(shared.user_stats.is_none());
        assert_eq!(transport.call_count(), 14);
    }

    #[tokio::test(start_paused = true)]
    async fn user_without_tips_gets_zeroed_stats() {
        let (cache, _transport) = cache_with(|function, args| match function {
            FN_GET_TIPPER_STATS => ok_body("0x09".to_string()),
            FN_IS_PREMIUM_TIPPER => ok_body("0x04".to_string()),
            _ => standard_responses(function, args),
        });

        let snapshot = cache.get_snapshot(Some(TIPPER), false).await.unwrap();
        assert_eq!(snapshot.user_stats, Some(TipperStats::default()));
    }

    #[tokio::test(start_paused = true)]
    async fn user_stats_failure_leaves_rest_intact() {
        let (cache, _transport) = cache_with(|function, args| match function {
            FN_IS_PREMIUM_TIPPER => http_500(),
            _ => standard_responses(function, args),
        });

        let snapshot = cache.get_snapshot(Some(TIPPER), false).await.unwrap();
        assert!(snapshot.user_stats.is_none());
        assert_eq!(snapshot.balance_micro_stx, 1000);
        assert!(snapshot.last_update.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_user_address_skips_user_calls() {
        let (cache, transport) = cache_with(standard_responses);

        let snapshot = cache.get_snapshot(Some("not-an-address"), false).await.unwrap();
        assert!(snapshot.user_stats.is_none());
        assert_eq!(transport.call_count(), 5);
    }
}
