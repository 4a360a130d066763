use super::request_queue::RequestQueue;
use crate::{
    clarity::{encode::encode_uint, ClarityDecoder, Principal, WireValue},
    constants::{FN_GET_TOTAL_TRANSACTIONS, FN_GET_TRANSACTION},
    error::Result,
    models::TransactionRecord,
};

/// Indices to fetch, newest first: `total` down to `max(1, total - limit + 1)`.
fn history_indices(total: u128, limit: u32) -> Vec<u128> {
    if total == 0 || limit == 0 {
        return Vec::new();
    }
    let oldest = total.saturating_sub(u128::from(limit) - 1).max(1);
    (oldest..=total).rev().collect()
}

pub struct HistoryFetcher {
    queue: RequestQueue,
    decoder: ClarityDecoder,
}

impl HistoryFetcher {
    pub fn new(queue: RequestQueue, decoder: ClarityDecoder) -> Self {
        Self { queue, decoder }
    }

    /// Most recent tips first. Individual entries that fail are skipped.
    pub async fn get_history(&self, limit: u32) -> Result<Vec<TransactionRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let body = self.queue.call(FN_GET_TOTAL_TRANSACTIONS, Vec::new()).await?;
        let total = self.decoder.uint_or_default(&body, FN_GET_TOTAL_TRANSACTIONS);

        let indices = history_indices(total, limit);
        let calls = indices
            .iter()
            .map(|index| self.queue.call(FN_GET_TRANSACTION, vec![encode_uint(*index)]));
        let responses = futures_util::future::join_all(calls).await;

        let mut records = Vec::with_capacity(indices.len());
        for (index, response) in indices.into_iter().zip(responses) {
            let body = match response {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!("Skipping transaction {}: call failed: {}", index, err);
                    continue;
                }
            };
            let wire = match self.decoder.wire_result(&body) {
                Ok(wire) => wire,
                Err(err) => {
                    tracing::warn!("Skipping transaction {}: {}", index, err);
                    continue;
                }
            };
            if wire.is_none() {
                tracing::debug!("Transaction {} not found", index);
                continue;
            }
            records.push(self.record_from_wire(index, &wire));
        }

        tracing::debug!("Fetched {} of {} transactions", records.len(), total);
        Ok(records)
    }

    fn record_from_wire(&self, index: u128, wire: &WireValue) -> TransactionRecord {
        TransactionRecord {
            tx_id: index,
            tipper: self.tipper_field(index, wire),
            amount_micro_stx: uint_field(index, wire, "amount"),
            block_height: uint_field(index, wire, "block-height"),
            timestamp: uint_field(index, wire, "timestamp"),
            has_message: match wire.field("has-message").map(WireValue::as_bool) {
                Some(Ok(flag)) => flag,
                _ => {
                    tracing::warn!("Transaction {} has-message unreadable, using false", index);
                    false
                }
            },
        }
    }

    fn tipper_field(&self, index: u128, wire: &WireValue) -> Option<Principal> {
        let field = wire.field("tipper")?;
        match self.decoder.principal_from_wire(field) {
            Ok(principal) => Some(principal),
            Err(err) => {
                tracing::warn!("Transaction {} tipper unreadable: {}", index, err);
                None
            }
        }
    }
}

fn uint_field(index: u128, wire: &WireValue, name: &str) -> u128 {
    match wire.field(name).map(WireValue::as_uint) {
        Some(Ok(value)) => value,
        _ => {
            tracing::warn!("Transaction {} {} unreadable, using 0", index, name);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clarity::encode::encode_principal;
    use crate::services::testing::{http_500, ok_body, ok_wrap, some_wrap, tuple_hex, ScriptedTransport};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    const TIPPER: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

    fn arg_index(args: &[String]) -> u128 {
        let hex = args[0].strip_prefix("0x01").unwrap();
        u128::from_str_radix(hex, 16).unwrap()
    }

    fn tx_tuple(index: u128) -> String {
        some_wrap(&tuple_hex(&[
            ("tipper", encode_principal(TIPPER).unwrap()),
            ("amount", encode_uint(index * 1_000_000)),
            ("block-height", encode_uint(100 + index)),
            ("timestamp", encode_uint(1_700_000_000 + index)),
            ("has-message", if index % 2 == 0 { "0x03".into() } else { "0x04".into() }),
        ]))
    }

    fn fetcher_with<F>(responder: F) -> (HistoryFetcher, Arc<ScriptedTransport>)
    where
        F: Fn(&str, &[String]) -> Result<Value> + Send + Sync + 'static,
    {
        let transport = Arc::new(ScriptedTransport::new(responder));
        let queue = RequestQueue::new(transport.clone(), Duration::ZERO);
        (HistoryFetcher::new(queue, ClarityDecoder::default()), transport)
    }

    fn contract_with_total(total: u128) -> impl Fn(&str, &[String]) -> Result<Value> {
        move |function, args| match function {
            FN_GET_TOTAL_TRANSACTIONS => ok_body(ok_wrap(&encode_uint(total))),
            FN_GET_TRANSACTION => ok_body(tx_tuple(arg_index(args))),
            _ => http_500(),
        }
    }

    #[test]
    fn indices_cover_window_newest_first() {
        assert_eq!(history_indices(3, 10), vec![3, 2, 1]);
        assert_eq!(history_indices(5, 2), vec![5, 4]);
        assert_eq!(history_indices(5, 5), vec![5, 4, 3, 2, 1]);
        assert!(history_indices(0, 10).is_empty());
        assert!(history_indices(7, 0).is_empty());
    }

    #[tokio::test]
    async fn history_is_most_recent_first() {
        let (fetcher, transport) = fetcher_with(contract_with_total(3));

        let records = fetcher.get_history(10).await.unwrap();
        let ids: Vec<u128> = records.iter().map(|r| r.tx_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(transport.call_count(), 4);

        let newest = &records[0];
        assert_eq!(newest.tipper, Some(Principal::Address(TIPPER.to_string())));
        assert_eq!(newest.amount_micro_stx, 3_000_000);
        assert_eq!(newest.block_height, 103);
        assert_eq!(newest.timestamp, 1_700_000_003);
        assert!(!newest.has_message);
        assert!(records[1].has_message);

        let calls = transport.calls();
        assert_eq!(calls[1].1, vec![encode_uint(3)]);
        assert_eq!(calls[3].1, vec![encode_uint(1)]);
    }

    #[tokio::test]
    async fn empty_contract_makes_one_call() {
        let (fetcher, transport) = fetcher_with(contract_with_total(0));
        assert!(fetcher.get_history(10).await.unwrap().is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn zero_limit_makes_no_calls() {
        let (fetcher, transport) = fetcher_with(contract_with_total(4));
        assert!(fetcher.get_history(0).await.unwrap().is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn limit_caps_the_window() {
        let (fetcher, _transport) = fetcher_with(contract_with_total(5));
        let ids: Vec<u128> = fetcher
            .get_history(2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.tx_id)
            .collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[tokio::test]
    async fn failed_and_missing_entries_are_skipped() {
        // Memastikan entri gagal atau kosong dilewati
        let (fetcher, _transport) = fetcher_with(|function, args| match function {
            FN_GET_TOTAL_TRANSACTIONS => ok_body(ok_wrap(&encode_uint(4))),
            FN_GET_TRANSACTION => match arg_index(args) {
                4 => http_500(),
                3 => ok_body("0x09".to_string()),
                2 => ok_body("0xnothex".to_string()),
                index => ok_body(tx_tuple(index)),
            },
            _ => http_500(),
        });

        let records = fetcher.get_history(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tx_id, 1);
    }

    #[tokio::test]
    async fn total_failure_propagates() {
        let (fetcher, _transport) = fetcher_with(|_, _| http_500());
        assert!(fetcher.get_history(10).await.is_err());
    }

    #[tokio::test]
    async fn partial_tuple_uses_field_defaults() {
        let (fetcher, _transport) = fetcher_with(|function, _| match function {
            FN_GET_TOTAL_TRANSACTIONS => ok_body(ok_wrap(&encode_uint(1))),
            _ => ok_body(some_wrap(&tuple_hex(&[("amount", encode_uint(42))]))),
        });

        let records = fetcher.get_history(10).await.unwrap();
        assert_eq!(records[0].amount_micro_stx, 42);
        assert_eq!(records[0].tipper, None);
        assert_eq!(records[0].block_height, 0);
        assert!(!records[0].has_message);
    }
}
