//! Contains the EIP-1559 signer that submits execution transactions.

use crate::{metrics, ExecutorError};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{BlockNumberOrTag, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use alloy_transport_http::Http;
use async_trait::async_trait;
use chainflow_providers::IActionExecutor;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

/// The constant priority fee: 2 gwei.
pub const MAX_PRIORITY_FEE_PER_GAS: u128 = 2_000_000_000;

/// Gas limit applied when estimation fails.
pub const FALLBACK_GAS_LIMIT: u64 = 500_000;

/// Numerator of the 20% gas estimation safety buffer.
const GAS_BUFFER_NUMERATOR: u64 = 12;
/// Denominator of the gas estimation safety buffer.
const GAS_BUFFER_DENOMINATOR: u64 = 10;

/// How long to wait for a receipt before giving up on observation.
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);
/// Delay between receipt polls.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The part of a confirmed receipt the engine consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    /// The transaction hash.
    pub tx_hash: B256,
    /// True for status 1, false for a revert.
    pub success: bool,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// The block the transaction landed in.
    pub block_number: Option<u64>,
}

/// The terminal result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// A receipt arrived within the wait window.
    Confirmed(ExecutionReceipt),
    /// The transaction was submitted but no receipt appeared in time. The
    /// hash is returned best-effort; no further action is taken.
    TimedOut(B256),
}

/// Submits workflow executions on-chain.
#[async_trait]
pub trait WorkflowExecutor {
    /// The address paying for and signing submissions.
    fn signer_address(&self) -> Address;

    /// Builds, signs, and submits an `executeWorkflow` call, then waits for
    /// its receipt.
    async fn execute_workflow(
        &self,
        workflow_id: u64,
        action_data: Bytes,
        new_next_run: u64,
        user: Address,
        gas_to_charge: U256,
    ) -> Result<ExecutionOutcome, ExecutorError>;
}

/// The [EvmSigner] submits EIP-1559 transactions to the action executor
/// contract.
///
/// Nonces are read fresh per transaction. That is only sound because the
/// worker loop is strictly sequential. Never run multiple workers against
/// the same key: they would race on nonces.
pub struct EvmSigner<T: Provider<Http<Client>>> {
    /// The inner Ethereum JSON-RPC provider.
    inner: T,
    /// The signing wallet.
    wallet: EthereumWallet,
    /// The signer address, cached from the key.
    address: Address,
    /// The action executor contract.
    executor: Address,
    /// The chain id baked into every transaction.
    chain_id: u64,
}

impl<T: Provider<Http<Client>>> std::fmt::Debug for EvmSigner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmSigner")
            .field("address", &self.address)
            .field("executor", &self.executor)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl<T: Provider<Http<Client>>> EvmSigner<T> {
    /// Creates a new [EvmSigner] from the worker's private key.
    pub fn new(inner: T, signer: PrivateKeySigner, executor: Address, chain_id: u64) -> Self {
        let address = signer.address();
        Self { inner, wallet: EthereumWallet::from(signer), address, executor, chain_id }
    }

    /// Computes the EIP-1559 fee caps from the latest block's base fee:
    /// `max_fee = 2 * base_fee + priority`.
    async fn fee_caps(&self) -> Result<(u128, u128), ExecutorError> {
        let block = self
            .inner
            .get_block_by_number(BlockNumberOrTag::Latest, false.into())
            .await
            .map_err(|e| ExecutorError::Rpc(e.to_string()))?
            .ok_or_else(|| ExecutorError::Rpc("no latest block".to_string()))?;
        let base_fee = block.header.base_fee_per_gas.unwrap_or_default() as u128;
        Ok((base_fee * 2 + MAX_PRIORITY_FEE_PER_GAS, MAX_PRIORITY_FEE_PER_GAS))
    }

    /// Polls for the receipt of `tx_hash` until it lands or the wait window
    /// closes.
    async fn wait_for_receipt(&self, tx_hash: B256) -> ExecutionOutcome {
        let deadline = tokio::time::Instant::now() + RECEIPT_TIMEOUT;
        loop {
            match self.inner.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    return ExecutionOutcome::Confirmed(ExecutionReceipt {
                        tx_hash,
                        success: receipt.status(),
                        gas_used: receipt.gas_used as u64,
                        block_number: receipt.block_number,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(target: "evm_signer", tx_hash = %tx_hash, "Receipt poll failed: {e}");
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return ExecutionOutcome::TimedOut(tx_hash);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl<T: Provider<Http<Client>> + Send + Sync> WorkflowExecutor for EvmSigner<T> {
    fn signer_address(&self) -> Address {
        self.address
    }

    async fn execute_workflow(
        &self,
        workflow_id: u64,
        action_data: Bytes,
        new_next_run: u64,
        user: Address,
        gas_to_charge: U256,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let calldata = IActionExecutor::executeWorkflowCall {
            workflowId: U256::from(workflow_id),
            actionData: action_data,
            newNextRun: U256::from(new_next_run),
            user,
            gasToCharge: gas_to_charge,
        }
        .abi_encode();

        let (max_fee, max_priority_fee) = self.fee_caps().await?;
        let nonce = self
            .inner
            .get_transaction_count(self.address)
            .await
            .map_err(|e| ExecutorError::Rpc(e.to_string()))?;

        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(self.executor)
            .with_input(Bytes::from(calldata))
            .with_nonce(nonce)
            .with_chain_id(self.chain_id)
            .with_max_fee_per_gas(max_fee)
            .with_max_priority_fee_per_gas(max_priority_fee);

        let gas_limit = match self.inner.estimate_gas(&tx).await {
            Ok(estimate) => {
                estimate.saturating_mul(GAS_BUFFER_NUMERATOR) / GAS_BUFFER_DENOMINATOR
            }
            Err(e) => {
                warn!(
                    target: "evm_signer",
                    workflow_id,
                    "Gas estimation failed: {e}, using fallback limit"
                );
                FALLBACK_GAS_LIMIT
            }
        };
        let tx = tx.with_gas_limit(gas_limit);

        let envelope =
            tx.build(&self.wallet).await.map_err(|e| ExecutorError::Wallet(e.to_string()))?;
        let tx_hash = *envelope.tx_hash();
        let _pending = self
            .inner
            .send_raw_transaction(&envelope.encoded_2718())
            .await
            .map_err(|e| ExecutorError::from_rpc(e.to_string()))?;
        metrics::TRANSACTIONS_SUBMITTED.inc();
        info!(
            target: "evm_signer",
            workflow_id,
            tx_hash = %tx_hash,
            nonce,
            gas_limit,
            "Submitted executeWorkflow transaction"
        );

        let outcome = self.wait_for_receipt(tx_hash).await;
        if let ExecutionOutcome::TimedOut(hash) = &outcome {
            error!(target: "evm_signer", tx_hash = %hash, "Timed out waiting for receipt");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_cap_formula_dominates_double_base_fee() {
        // max_fee = 2 * base_fee + priority, so the invariant
        // max_fee >= 2 * base_fee + priority holds with equality.
        for base_fee in [0u128, 1, 25_000_000_000, 1_000_000_000_000] {
            let max_fee = base_fee * 2 + MAX_PRIORITY_FEE_PER_GAS;
            assert!(max_fee >= 2 * base_fee + MAX_PRIORITY_FEE_PER_GAS);
        }
    }

    #[test]
    fn test_gas_buffer_is_twenty_percent() {
        let buffered = 100_000u64.saturating_mul(GAS_BUFFER_NUMERATOR) / GAS_BUFFER_DENOMINATOR;
        assert_eq!(buffered, 120_000);
    }
}
