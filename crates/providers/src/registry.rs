//! Contains the alloy-backed gateway over the workflow registry contract.

use crate::{bindings::IWorkflowRegistry, ProviderError, WorkflowProvider};
use alloy_primitives::{Address, TxKind, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use alloy_transport_http::Http;
use async_trait::async_trait;
use chainflow_primitives::{ActionKind, TriggerKind, Workflow};
use reqwest::Client;

/// The [RegistryGateway] reads the on-chain workflow catalog through
/// `eth_call`s against the registry contract. It is stateless: it holds
/// only the contract address and a shared provider handle, so a single
/// gateway can serve a whole sweep's worth of concurrent lookups.
#[derive(Debug, Clone)]
pub struct RegistryGateway<T: Provider<Http<Client>>> {
    /// The inner Ethereum JSON-RPC provider.
    inner: T,
    /// The registry contract address.
    address: Address,
}

impl<T: Provider<Http<Client>>> RegistryGateway<T> {
    /// Creates a new [RegistryGateway] for the contract at `address`.
    pub const fn new(inner: T, address: Address) -> Self {
        Self { inner, address }
    }

    /// Issues a view call against the registry contract.
    async fn view_call(&self, calldata: Vec<u8>) -> Result<Vec<u8>, ProviderError> {
        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.address)),
            input: TransactionInput::new(calldata.into()),
            ..Default::default()
        };
        let output = self
            .inner
            .call(&tx)
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(output.to_vec())
    }
}

#[async_trait]
impl<T: Provider<Http<Client>> + Send + Sync> WorkflowProvider for RegistryGateway<T> {
    async fn total_workflows(&self) -> Result<u64, ProviderError> {
        let calldata = IWorkflowRegistry::totalWorkflowsCall {}.abi_encode();
        let output = self.view_call(calldata).await?;
        let decoded = IWorkflowRegistry::totalWorkflowsCall::abi_decode_returns(&output, true)?;
        u64::try_from(decoded.total).map_err(|_| ProviderError::OutOfRange("totalWorkflows"))
    }

    async fn workflow_by_id(&self, id: u64) -> Result<Workflow, ProviderError> {
        let calldata =
            IWorkflowRegistry::getWorkflowCall { workflowId: U256::from(id) }.abi_encode();
        let output = self.view_call(calldata).await?;
        let decoded = IWorkflowRegistry::getWorkflowCall::abi_decode_returns(&output, true)?;
        let raw = decoded.workflow;
        Ok(Workflow {
            id,
            owner: raw.owner,
            trigger_kind: TriggerKind::try_from(raw.triggerType)
                .map_err(|e| ProviderError::Decode(e.to_string()))?,
            trigger_data: raw.triggerData,
            action_kind: ActionKind::try_from(raw.actionType)
                .map_err(|e| ProviderError::Decode(e.to_string()))?,
            action_data: raw.actionData,
            next_run: u64::try_from(raw.nextRun)
                .map_err(|_| ProviderError::OutOfRange("nextRun"))?,
            interval: u64::try_from(raw.interval)
                .map_err(|_| ProviderError::OutOfRange("interval"))?,
            active: raw.active,
            gas_budget: raw.gasBudget,
        })
    }

    async fn workflows_by_owner(&self, owner: Address) -> Result<Vec<u64>, ProviderError> {
        let calldata = IWorkflowRegistry::getWorkflowsByOwnerCall { owner }.abi_encode();
        let output = self.view_call(calldata).await?;
        let decoded = IWorkflowRegistry::getWorkflowsByOwnerCall::abi_decode_returns(&output, true)?;
        decoded
            .workflowIds
            .into_iter()
            .map(|id| u64::try_from(id).map_err(|_| ProviderError::OutOfRange("workflowId")))
            .collect()
    }
}
