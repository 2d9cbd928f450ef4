//! Test utilities for the gateway traits.

use crate::{EscrowProvider, ProviderError, TransferLogProvider, WorkflowProvider};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chainflow_primitives::Workflow;
use std::collections::HashMap;

/// A mock [WorkflowProvider] backed by an in-memory catalog.
#[derive(Debug, Default, Clone)]
pub struct MockWorkflowProvider {
    /// The registered workflows, keyed by id.
    pub workflows: HashMap<u64, Workflow>,
    /// Ids whose fetch fails with a transport error.
    pub failing_ids: Vec<u64>,
}

impl MockWorkflowProvider {
    /// Creates a mock catalog from a list of workflows.
    pub fn new(workflows: impl IntoIterator<Item = Workflow>) -> Self {
        Self {
            workflows: workflows.into_iter().map(|w| (w.id, w)).collect(),
            failing_ids: Vec::new(),
        }
    }
}

#[async_trait]
impl WorkflowProvider for MockWorkflowProvider {
    async fn total_workflows(&self) -> Result<u64, ProviderError> {
        Ok(self.workflows.keys().max().copied().unwrap_or_default())
    }

    async fn workflow_by_id(&self, id: u64) -> Result<Workflow, ProviderError> {
        if self.failing_ids.contains(&id) {
            return Err(ProviderError::Transport("mock rpc failure".to_string()));
        }
        self.workflows
            .get(&id)
            .cloned()
            .ok_or_else(|| ProviderError::Decode(format!("no workflow {id}")))
    }

    async fn workflows_by_owner(&self, owner: Address) -> Result<Vec<u64>, ProviderError> {
        let mut ids: Vec<u64> = self
            .workflows
            .values()
            .filter(|w| w.owner == owner)
            .map(|w| w.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// A mock [EscrowProvider] with fixed balances.
#[derive(Debug, Default, Clone)]
pub struct MockEscrowProvider {
    /// Balances per user.
    pub balances: HashMap<Address, U256>,
    /// When set, every lookup fails with a transport error.
    pub failing: bool,
}

#[async_trait]
impl EscrowProvider for MockEscrowProvider {
    async fn balance_of(&self, user: Address) -> Result<U256, ProviderError> {
        if self.failing {
            return Err(ProviderError::Transport("mock escrow failure".to_string()));
        }
        Ok(self.balances.get(&user).copied().unwrap_or_default())
    }
}

/// A mock [TransferLogProvider] returning canned transfer values.
#[derive(Debug, Default, Clone)]
pub struct MockTransferLogProvider {
    /// Transfer values returned for any scan.
    pub transfers: Vec<U256>,
    /// When set, every scan fails with a transport error.
    pub failing: bool,
}

#[async_trait]
impl TransferLogProvider for MockTransferLogProvider {
    async fn transfers_to(
        &self,
        _token: Address,
        _recipient: Address,
        _lookback: u64,
    ) -> Result<Vec<U256>, ProviderError> {
        if self.failing {
            return Err(ProviderError::Transport("mock log scan failure".to_string()));
        }
        Ok(self.transfers.clone())
    }
}
