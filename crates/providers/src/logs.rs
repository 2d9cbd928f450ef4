//! Contains the transfer log scanner used by the wallet-event trigger.

use crate::{bindings::Transfer, ProviderError, TransferLogProvider};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::Filter;
use alloy_sol_types::SolEvent;
use alloy_transport_http::Http;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// The default number of trailing blocks a scan covers.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 100;

/// The [LogScanner] queries recent ERC-20 `Transfer` logs for a monitored
/// recipient. One `eth_getLogs` round trip per evaluation; undecodable logs
/// are skipped rather than failing the scan.
#[derive(Debug, Clone)]
pub struct LogScanner<T: Provider<Http<Client>>> {
    /// The inner Ethereum JSON-RPC provider.
    inner: T,
}

impl<T: Provider<Http<Client>>> LogScanner<T> {
    /// Creates a new [LogScanner].
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Provider<Http<Client>> + Send + Sync> TransferLogProvider for LogScanner<T> {
    async fn transfers_to(
        &self,
        token: Address,
        recipient: Address,
        lookback: u64,
    ) -> Result<Vec<U256>, ProviderError> {
        let latest = self
            .inner
            .get_block_number()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let from_block = latest.saturating_sub(lookback);

        let filter = Filter::new()
            .address(token)
            .event_signature(Transfer::SIGNATURE_HASH)
            .topic2(recipient.into_word())
            .from_block(from_block)
            .to_block(latest);
        let logs = self
            .inner
            .get_logs(&filter)
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        debug!(
            target: "log_scanner",
            token = %token,
            recipient = %recipient,
            from_block,
            to_block = latest,
            count = logs.len(),
            "Scanned transfer logs"
        );

        Ok(logs
            .iter()
            .filter_map(|log| Transfer::decode_log(&log.inner, true).ok())
            .map(|decoded| decoded.data.value)
            .collect())
    }
}
