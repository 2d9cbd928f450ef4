//! This module contains the [Job] payload exchanged over the execution queue.

use crate::{ActionKind, CodecError, TriggerKind, Workflow};
use alloy_primitives::{hex, Address, Bytes};

/// The list key under which jobs are queued on the broker.
pub const JOB_QUEUE_KEY: &str = "workflow_jobs";

/// The reschedule interval applied when a job carries none.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// A single workflow execution request.
///
/// Jobs are produced by the scheduler when a trigger is ready and consumed
/// by exactly one worker. The JSON field names are part of the queue wire
/// format and must not change. `action_data` travels as a hex string (an
/// optional `0x` prefix is accepted on decode).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// The workflow to execute.
    pub workflow_id: u64,
    /// The workflow owner, debited for the execution.
    pub owner: Address,
    /// The trigger family that fired.
    pub trigger_type: TriggerKind,
    /// The action family to perform.
    pub action_type: ActionKind,
    /// Hex-encoded action parameters, passed through to the executor.
    pub action_data: String,
    /// The workflow's `next_run` at enqueue time.
    pub next_run: u64,
    /// Maximum amount debitable from the owner's escrow.
    pub gas_budget: u128,
    /// Reschedule delta in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Number of times this job has been re-issued. Carried on the wire for
    /// compatibility; the single-attempt worker never increments it.
    #[serde(default)]
    pub retry_count: u32,
}

const fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl Job {
    /// Builds a job from a ready workflow snapshot.
    pub fn from_workflow(workflow: &Workflow) -> Result<Self, CodecError> {
        let gas_budget = workflow
            .gas_budget
            .try_into()
            .map_err(|_| CodecError::OutOfRange("gasBudget"))?;
        Ok(Self {
            workflow_id: workflow.id,
            owner: workflow.owner,
            trigger_type: workflow.trigger_kind,
            action_type: workflow.action_kind,
            action_data: hex::encode(&workflow.action_data),
            next_run: workflow.next_run,
            gas_budget,
            interval: workflow.interval,
            retry_count: 0,
        })
    }

    /// Decodes the hex action data back into bytes. Empty and `"0x"` inputs
    /// decode to an empty byte string.
    pub fn action_bytes(&self) -> Result<Bytes, CodecError> {
        let stripped = self.action_data.strip_prefix("0x").unwrap_or(&self.action_data);
        if stripped.is_empty() {
            return Ok(Bytes::new());
        }
        hex::decode(stripped).map(Into::into).map_err(|e| CodecError::Hex(e.to_string()))
    }

    /// The reschedule interval, defaulting when the producer sent zero.
    pub const fn effective_interval(&self) -> u64 {
        if self.interval == 0 {
            DEFAULT_INTERVAL_SECS
        } else {
            self.interval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use proptest::prelude::*;

    fn sample_workflow() -> Workflow {
        Workflow {
            id: 7,
            owner: Address::repeat_byte(0xAA),
            trigger_kind: TriggerKind::Time,
            trigger_data: Bytes::new(),
            action_kind: ActionKind::NativeTransfer,
            action_data: Bytes::from(vec![0x01, 0x02, 0x03]),
            next_run: 1_700_000_000,
            interval: 3600,
            active: true,
            gas_budget: U256::from(10u128.pow(17)),
        }
    }

    #[test]
    fn test_job_wire_field_names() {
        let job = Job::from_workflow(&sample_workflow()).unwrap();
        let value: serde_json::Value = serde_json::to_value(&job).unwrap();
        for field in [
            "workflowId",
            "owner",
            "triggerType",
            "actionType",
            "actionData",
            "nextRun",
            "gasBudget",
            "interval",
            "retryCount",
        ] {
            assert!(value.get(field).is_some(), "missing wire field {field}");
        }
        assert_eq!(value["workflowId"], 7);
        assert_eq!(value["triggerType"], 1);
        assert_eq!(value["actionType"], 1);
        assert_eq!(value["actionData"], "010203");
        assert_eq!(value["gasBudget"], 100_000_000_000_000_000u64);
        assert_eq!(value["retryCount"], 0);
    }

    #[test]
    fn test_action_bytes_accepts_optional_prefix() {
        let mut job = Job::from_workflow(&sample_workflow()).unwrap();
        assert_eq!(job.action_bytes().unwrap(), Bytes::from(vec![0x01, 0x02, 0x03]));

        job.action_data = "0x010203".to_string();
        assert_eq!(job.action_bytes().unwrap(), Bytes::from(vec![0x01, 0x02, 0x03]));

        job.action_data = String::new();
        assert_eq!(job.action_bytes().unwrap(), Bytes::new());

        job.action_data = "0x".to_string();
        assert_eq!(job.action_bytes().unwrap(), Bytes::new());
    }

    #[test]
    fn test_missing_interval_and_retry_count_default() {
        let raw = r#"{
            "workflowId": 3,
            "owner": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "triggerType": 2,
            "actionType": 3,
            "actionData": "",
            "nextRun": 0,
            "gasBudget": 1
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.interval, 60);
        assert_eq!(job.retry_count, 0);
    }

    #[test]
    fn test_oversized_gas_budget_is_an_error() {
        let mut workflow = sample_workflow();
        workflow.gas_budget = U256::MAX;
        assert!(matches!(
            Job::from_workflow(&workflow),
            Err(CodecError::OutOfRange("gasBudget"))
        ));
    }

    proptest! {
        #[test]
        fn test_job_json_round_trip(
            workflow_id in 1u64..u64::MAX,
            owner in any::<[u8; 20]>(),
            action_data in proptest::collection::vec(any::<u8>(), 0..128),
            next_run in any::<u64>(),
            gas_budget in any::<u128>(),
            interval in 1u64..u64::MAX,
            retry_count in any::<u32>(),
        ) {
            let job = Job {
                workflow_id,
                owner: Address::from(owner),
                trigger_type: TriggerKind::Price,
                action_type: ActionKind::ContractCall,
                action_data: hex::encode(&action_data),
                next_run,
                gas_budget,
                interval,
                retry_count,
            };
            let round_tripped: Job = serde_json::from_str(&serde_json::to_string(&job).unwrap()).unwrap();
            prop_assert_eq!(&round_tripped, &job);
            prop_assert_eq!(round_tripped.action_bytes().unwrap().to_vec(), action_data);
        }
    }
}
