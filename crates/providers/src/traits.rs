//! Seam traits for the on-chain gateways.

use crate::ProviderError;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chainflow_primitives::Workflow;

/// Read access to the on-chain workflow catalog.
#[async_trait]
pub trait WorkflowProvider {
    /// Returns the total number of registered workflows. Ids are dense
    /// starting at 1, so this doubles as the upper scan bound.
    async fn total_workflows(&self) -> Result<u64, ProviderError>;

    /// Fetches the workflow with the given id.
    async fn workflow_by_id(&self, id: u64) -> Result<Workflow, ProviderError>;

    /// Returns the ids of all workflows registered by `owner`.
    async fn workflows_by_owner(&self, owner: Address) -> Result<Vec<u64>, ProviderError>;
}

/// Read access to the fee escrow.
#[async_trait]
pub trait EscrowProvider {
    /// Returns the gas balance held in escrow for `user`.
    async fn balance_of(&self, user: Address) -> Result<U256, ProviderError>;
}

/// Read access to recent ERC-20 transfer logs.
#[async_trait]
pub trait TransferLogProvider {
    /// Returns the values of all `Transfer` logs on `token` with
    /// `to == recipient` within the last `lookback` blocks.
    async fn transfers_to(
        &self,
        token: Address,
        recipient: Address,
        lookback: u64,
    ) -> Result<Vec<U256>, ProviderError>;
}
