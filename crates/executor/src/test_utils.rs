//! Test utilities for the execution path.

use crate::{ExecutionOutcome, ExecutionReceipt, ExecutorError, WorkflowExecutor};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// What a [MockExecutor] does with every call.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Confirm with receipt status 1.
    Succeed,
    /// Confirm with receipt status 0.
    Revert,
    /// Time out waiting for the receipt.
    TimeOut,
    /// Fail the submission with the given error text.
    Fail(String),
}

/// One recorded `execute_workflow` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorCall {
    /// The workflow id passed.
    pub workflow_id: u64,
    /// The action bytes passed.
    pub action_data: Bytes,
    /// The rescheduled `next_run` passed.
    pub new_next_run: u64,
    /// The owner passed.
    pub user: Address,
    /// The gas budget passed.
    pub gas_to_charge: U256,
}

/// A mock [WorkflowExecutor] that records calls and answers with a scripted
/// outcome.
#[derive(Debug)]
pub struct MockExecutor {
    outcome: ScriptedOutcome,
    calls: Mutex<Vec<ExecutorCall>>,
}

impl MockExecutor {
    /// The canned hash every mock submission reports.
    pub const TX_HASH: B256 = B256::repeat_byte(0x42);

    /// A mock whose executions confirm with status 1.
    pub fn succeeding() -> Self {
        Self::with_outcome(ScriptedOutcome::Succeed)
    }

    /// A mock whose executions confirm with status 0.
    pub fn reverting() -> Self {
        Self::with_outcome(ScriptedOutcome::Revert)
    }

    /// A mock with an explicit scripted outcome.
    pub fn with_outcome(outcome: ScriptedOutcome) -> Self {
        Self { outcome, calls: Mutex::new(Vec::new()) }
    }

    /// The calls recorded so far.
    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl WorkflowExecutor for MockExecutor {
    fn signer_address(&self) -> Address {
        Address::repeat_byte(0x99)
    }

    async fn execute_workflow(
        &self,
        workflow_id: u64,
        action_data: Bytes,
        new_next_run: u64,
        user: Address,
        gas_to_charge: U256,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(ExecutorCall {
            workflow_id,
            action_data,
            new_next_run,
            user,
            gas_to_charge,
        });
        match &self.outcome {
            ScriptedOutcome::Succeed => Ok(ExecutionOutcome::Confirmed(ExecutionReceipt {
                tx_hash: Self::TX_HASH,
                success: true,
                gas_used: 21_000,
                block_number: Some(1),
            })),
            ScriptedOutcome::Revert => Ok(ExecutionOutcome::Confirmed(ExecutionReceipt {
                tx_hash: Self::TX_HASH,
                success: false,
                gas_used: 21_000,
                block_number: Some(1),
            })),
            ScriptedOutcome::TimeOut => Ok(ExecutionOutcome::TimedOut(Self::TX_HASH)),
            ScriptedOutcome::Fail(message) => Err(ExecutorError::from_rpc(message.clone())),
        }
    }
}
