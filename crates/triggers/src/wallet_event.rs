//! Contains the wallet-event trigger evaluator.

use crate::TriggerError;
use chainflow_providers::{TransferLogProvider, DEFAULT_LOOKBACK_BLOCKS};
use chainflow_primitives::{TransferDirection, TriggerData, TriggerKind, Workflow};
use tracing::debug;

/// Ready iff the workflow is active and a qualifying ERC-20 transfer into
/// the monitored wallet landed within the scan window.
///
/// Known gap: native-transfer detection (no token address) would require
/// scanning transaction receipts and is not implemented; those triggers
/// evaluate not-ready. Outbound and balance-change directions from the
/// on-chain form are likewise not-ready.
#[derive(Debug)]
pub struct WalletEventTrigger<L> {
    logs: L,
    lookback: u64,
}

impl<L: TransferLogProvider> WalletEventTrigger<L> {
    /// Creates a new [WalletEventTrigger] scanning the default window.
    pub const fn new(logs: L) -> Self {
        Self { logs, lookback: DEFAULT_LOOKBACK_BLOCKS }
    }

    /// Overrides the number of trailing blocks scanned per evaluation.
    pub const fn with_lookback(mut self, lookback: u64) -> Self {
        self.lookback = lookback;
        self
    }

    /// Evaluates the trigger.
    pub async fn is_ready(&self, workflow: &Workflow) -> Result<bool, TriggerError> {
        if !workflow.active {
            return Ok(false);
        }
        let TriggerData::WalletEvent { monitor, token, min_amount, direction } =
            TriggerData::decode(TriggerKind::WalletEvent, &workflow.trigger_data)?
        else {
            return Ok(false);
        };
        if direction != TransferDirection::In {
            return Ok(false);
        }
        let Some(token) = token else {
            // Native transfers would need receipt scans; explicit gap.
            return Ok(false);
        };
        let monitor = monitor.unwrap_or(workflow.owner);
        let transfers = self.logs.transfers_to(token, monitor, self.lookback).await?;
        let ready = transfers.iter().any(|value| *value >= min_amount);
        debug!(
            target: "wallet_event_trigger",
            workflow_id = workflow.id,
            monitor = %monitor,
            token = %token,
            transfers = transfers.len(),
            ready,
            "Evaluated wallet event trigger"
        );
        Ok(ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::wallet_event_workflow;
    use alloy_primitives::{Address, U256};
    use chainflow_providers::test_utils::MockTransferLogProvider;

    fn scanner(transfers: Vec<u64>) -> MockTransferLogProvider {
        MockTransferLogProvider {
            transfers: transfers.into_iter().map(U256::from).collect(),
            failing: false,
        }
    }

    #[tokio::test]
    async fn test_qualifying_transfer_is_ready() {
        let trigger = WalletEventTrigger::new(scanner(vec![500, 1500]));
        let workflow = wallet_event_workflow(Some(Address::repeat_byte(0xBB)), 1000);
        assert!(trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_transfer_at_exact_minimum_qualifies() {
        let trigger = WalletEventTrigger::new(scanner(vec![1000]));
        let workflow = wallet_event_workflow(Some(Address::repeat_byte(0xBB)), 1000);
        assert!(trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_small_transfers_do_not_qualify() {
        let trigger = WalletEventTrigger::new(scanner(vec![1, 999]));
        let workflow = wallet_event_workflow(Some(Address::repeat_byte(0xBB)), 1000);
        assert!(!trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_native_branch_is_not_ready() {
        let trigger = WalletEventTrigger::new(scanner(vec![10_000]));
        let workflow = wallet_event_workflow(None, 0);
        assert!(!trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_inactive_is_not_ready() {
        let trigger = WalletEventTrigger::new(scanner(vec![10_000]));
        let mut workflow = wallet_event_workflow(Some(Address::repeat_byte(0xBB)), 1);
        workflow.active = false;
        assert!(!trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_scan_failure_is_an_error() {
        let trigger = WalletEventTrigger::new(MockTransferLogProvider {
            transfers: Vec::new(),
            failing: true,
        });
        let workflow = wallet_event_workflow(Some(Address::repeat_byte(0xBB)), 1);
        assert!(matches!(trigger.is_ready(&workflow).await, Err(TriggerError::Logs(_))));
    }
}
