//! Contains the blocking job worker loop.

use crate::{
    metrics, ExecutionHistory, ExecutionOutcome, ExecutionRecord, WorkflowExecutor,
};
use alloy_primitives::U256;
use chainflow_primitives::{unix_now, Job};
use chainflow_providers::EscrowProvider;
use chainflow_queue::JobQueue;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{error, info, warn};

/// Blocking-pop timeout against the queue.
const POP_TIMEOUT: Duration = Duration::from_secs(5);

/// Backoff applied after an unexpected queue failure.
const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(2);

/// The [JobWorker] consumes the execution queue strictly sequentially: one
/// job is fully processed (preflight, build, sign, submit, receipt wait)
/// before the next pop. That sequencing is what keeps fresh-read nonces
/// correct.
///
/// Every job gets exactly one attempt. The scheduler is the system's retry
/// engine: `next_run` only advances on-chain when an execution succeeds, so
/// a failed workflow stays ready and the next sweep re-issues it with a
/// fresh balance check.
pub struct JobWorker<Q, E, X> {
    /// The job source.
    queue: Q,
    /// The escrow gateway used for preflight balance checks.
    escrow: E,
    /// The transaction submitter.
    executor: X,
    /// The execution ledger, when history is enabled.
    history: Option<Box<dyn ExecutionHistory + Send>>,
    /// Flipped by the process interrupt handler. The in-flight job always
    /// completes; there is no mid-transaction cancellation.
    running: Arc<AtomicBool>,
}

impl<Q, E, X> std::fmt::Debug for JobWorker<Q, E, X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobWorker")
            .field("history_enabled", &self.history.is_some())
            .finish_non_exhaustive()
    }
}

impl<Q, E, X> JobWorker<Q, E, X>
where
    Q: JobQueue + Send + Sync,
    E: EscrowProvider + Send + Sync,
    X: WorkflowExecutor + Send + Sync,
{
    /// Creates a new [JobWorker] without history recording.
    pub fn new(queue: Q, escrow: E, executor: X, running: Arc<AtomicBool>) -> Self {
        Self { queue, escrow, executor, history: None, running }
    }

    /// Attaches an execution history store.
    pub fn with_history(mut self, history: Box<dyn ExecutionHistory + Send>) -> Self {
        self.history = Some(history);
        self
    }

    /// Runs the worker loop until the running flag is lowered.
    pub async fn run(&mut self) {
        info!(
            target: "job_worker",
            signer = %self.executor.signer_address(),
            "Job worker started"
        );
        while self.running.load(Ordering::Relaxed) {
            match self.queue.pop_job(POP_TIMEOUT).await {
                Ok(Some(job)) => self.process_job(job).await,
                Ok(None) => continue,
                Err(e) => {
                    error!(target: "job_worker", "Queue pop failed: {e}");
                    tokio::time::sleep(QUEUE_ERROR_BACKOFF).await;
                }
            }
        }
        info!(target: "job_worker", "Job worker stopped");
    }

    /// Processes a single job. All failure paths drop the job; none
    /// re-enqueue.
    async fn process_job(&mut self, job: Job) {
        let gas_budget = U256::from(job.gas_budget);

        // Preflight: skip the submission entirely when the owner's escrow
        // cannot cover the budget. A failed check is not a failed preflight;
        // the executor contract reverts if the owner is actually short.
        match self.escrow.balance_of(job.owner).await {
            Ok(balance) if balance < gas_budget => {
                warn!(
                    target: "job_worker",
                    workflow_id = job.workflow_id,
                    owner = %job.owner,
                    %balance,
                    required = %gas_budget,
                    "Owner escrow below gas budget, dropping job"
                );
                metrics::JOBS_DROPPED_UNDERFUNDED.inc();
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    target: "job_worker",
                    workflow_id = job.workflow_id,
                    "Escrow preflight failed: {e}, proceeding anyway"
                );
            }
        }

        let action_data = match job.action_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(
                    target: "job_worker",
                    workflow_id = job.workflow_id,
                    "Undecodable action data: {e}, dropping job"
                );
                metrics::JOB_FAILURES.inc();
                return;
            }
        };
        let new_next_run = unix_now() + job.effective_interval();

        info!(target: "job_worker", workflow_id = job.workflow_id, "Executing workflow");
        match self
            .executor
            .execute_workflow(job.workflow_id, action_data, new_next_run, job.owner, gas_budget)
            .await
        {
            Ok(ExecutionOutcome::Confirmed(receipt)) => {
                if receipt.success {
                    info!(
                        target: "job_worker",
                        workflow_id = job.workflow_id,
                        tx_hash = %receipt.tx_hash,
                        gas_used = receipt.gas_used,
                        "Workflow executed"
                    );
                    metrics::JOBS_EXECUTED.inc();
                } else {
                    error!(
                        target: "job_worker",
                        workflow_id = job.workflow_id,
                        tx_hash = %receipt.tx_hash,
                        "Execution reverted, dropping job"
                    );
                    metrics::JOBS_REVERTED.inc();
                }
                self.record(&job, receipt.tx_hash, receipt.success);
            }
            Ok(ExecutionOutcome::TimedOut(tx_hash)) => {
                warn!(
                    target: "job_worker",
                    workflow_id = job.workflow_id,
                    tx_hash = %tx_hash,
                    "No receipt within the wait window, moving on"
                );
                metrics::RECEIPT_TIMEOUTS.inc();
            }
            Err(e) if e.is_underfunded() => {
                warn!(
                    target: "job_worker",
                    workflow_id = job.workflow_id,
                    owner = %job.owner,
                    "Execution rejected for insufficient funds: {e}, dropping job"
                );
                metrics::JOBS_DROPPED_UNDERFUNDED.inc();
            }
            Err(e) => {
                error!(
                    target: "job_worker",
                    workflow_id = job.workflow_id,
                    "Execution failed: {e}, dropping job; next sweep will re-issue"
                );
                metrics::JOB_FAILURES.inc();
            }
        }
    }

    /// Appends the outcome to the execution ledger, when one is attached.
    fn record(&mut self, job: &Job, tx_hash: alloy_primitives::B256, success: bool) {
        if let Some(history) = self.history.as_mut() {
            let record = ExecutionRecord {
                workflow_id: job.workflow_id,
                owner: job.owner,
                tx_hash,
                success,
                gas_budget: job.gas_budget,
                executed_at: unix_now(),
            };
            if let Err(e) = history.put(&record) {
                warn!(target: "job_worker", tx_hash = %tx_hash, "History write failed: {e}");
            }
        }
    }

    /// Processes at most one job, returning whether one was popped. Lets
    /// tests drive the loop body without the blocking outer loop.
    pub async fn step(&mut self, timeout: Duration) -> Result<bool, chainflow_queue::QueueError> {
        match self.queue.pop_job(timeout).await? {
            Some(job) => {
                self.process_job(job).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockExecutor, ScriptedOutcome};
    use crate::{ExecutionHistory, MemoryHistoryStore};
    use alloy_primitives::Address;
    use chainflow_primitives::{ActionKind, TriggerKind};
    use chainflow_providers::test_utils::MockEscrowProvider;
    use chainflow_queue::{JobQueue, MemoryJobQueue};
    use std::collections::HashMap;

    fn job(gas_budget: u128) -> Job {
        Job {
            workflow_id: 7,
            owner: Address::repeat_byte(0xAA),
            trigger_type: TriggerKind::Time,
            action_type: ActionKind::NativeTransfer,
            action_data: "0102".to_string(),
            next_run: 1_700_000_000,
            gas_budget,
            interval: 3600,
            retry_count: 0,
        }
    }

    fn escrow(balance: u128) -> MockEscrowProvider {
        MockEscrowProvider {
            balances: HashMap::from([(Address::repeat_byte(0xAA), U256::from(balance))]),
            failing: false,
        }
    }

    async fn queue_with(job: &Job) -> MemoryJobQueue {
        let queue = MemoryJobQueue::new();
        queue.push_job(job).await.unwrap();
        queue
    }

    #[tokio::test]
    async fn test_underfunded_owner_drops_without_execution() {
        // Balance 5e16 against a 1e17 budget: the job is dropped silently.
        let queue = queue_with(&job(10u128.pow(17))).await;
        let executor = MockExecutor::succeeding();
        let mut worker =
            JobWorker::new(queue, escrow(5 * 10u128.pow(16)), executor, running());
        assert!(worker.step(Duration::ZERO).await.unwrap());
        assert!(worker.executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_preflight_proceeds() {
        let queue = queue_with(&job(10u128.pow(17))).await;
        let escrow = MockEscrowProvider { balances: HashMap::new(), failing: true };
        let mut worker = JobWorker::new(queue, escrow, MockExecutor::succeeding(), running());
        assert!(worker.step(Duration::ZERO).await.unwrap());
        assert_eq!(worker.executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_execution_records_history() {
        let queue = queue_with(&job(1)).await;
        let mut worker = JobWorker::new(queue, escrow(10), MockExecutor::succeeding(), running())
            .with_history(Box::new(MemoryHistoryStore::new()));
        assert!(worker.step(Duration::ZERO).await.unwrap());

        let call = worker.executor.calls().remove(0);
        assert_eq!(call.workflow_id, 7);
        assert_eq!(call.action_data.to_vec(), vec![0x01, 0x02]);
        assert_eq!(call.gas_to_charge, U256::from(1u64));
        // new_next_run = now + interval, so it lands beyond the stored one.
        assert!(call.new_next_run > 1_700_000_000);

        let history = worker.history.as_ref().unwrap();
        assert!(history.get(MockExecutor::TX_HASH).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reverted_execution_is_terminal() {
        let queue = queue_with(&job(1)).await;
        let mut worker =
            JobWorker::new(queue.clone(), escrow(10), MockExecutor::reverting(), running());
        assert!(worker.step(Duration::ZERO).await.unwrap());
        // Terminal: nothing is re-enqueued.
        assert_eq!(queue.depth().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_receipt_timeout_moves_on() {
        let queue = queue_with(&job(1)).await;
        let mut worker = JobWorker::new(
            queue.clone(),
            escrow(10),
            MockExecutor::with_outcome(ScriptedOutcome::TimeOut),
            running(),
        );
        assert!(worker.step(Duration::ZERO).await.unwrap());
        assert_eq!(queue.depth().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_funds_error_is_dropped() {
        let queue = queue_with(&job(1)).await;
        let mut worker = JobWorker::new(
            queue.clone(),
            escrow(10),
            MockExecutor::with_outcome(ScriptedOutcome::Fail(
                "execution reverted: insufficient balance".to_string(),
            )),
            running(),
        );
        assert!(worker.step(Duration::ZERO).await.unwrap());
        assert_eq!(queue.depth().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_action_data_executes() {
        let mut empty = job(1);
        empty.action_data = "0x".to_string();
        let queue = queue_with(&empty).await;
        let mut worker = JobWorker::new(queue, escrow(10), MockExecutor::succeeding(), running());
        assert!(worker.step(Duration::ZERO).await.unwrap());
        let call = worker.executor.calls().remove(0);
        assert!(call.action_data.is_empty());
    }

    #[tokio::test]
    async fn test_empty_queue_step_is_a_no_op() {
        let queue = MemoryJobQueue::new();
        let mut worker = JobWorker::new(queue, escrow(10), MockExecutor::succeeding(), running());
        assert!(!worker.step(Duration::ZERO).await.unwrap());
    }

    fn running() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    #[tokio::test]
    async fn test_lowered_flag_stops_the_loop() {
        let queue = MemoryJobQueue::new();
        let flag = Arc::new(AtomicBool::new(false));
        let mut worker =
            JobWorker::new(queue, escrow(10), MockExecutor::succeeding(), flag.clone());
        // With the flag already lowered the loop exits without popping.
        worker.run().await;
        assert!(worker.executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_action_data_is_dropped() {
        let mut bad = job(1);
        bad.action_data = "zz".to_string();
        let queue = queue_with(&bad).await;
        let mut worker =
            JobWorker::new(queue.clone(), escrow(10), MockExecutor::succeeding(), running());
        assert!(worker.step(Duration::ZERO).await.unwrap());
        assert!(worker.executor.calls().is_empty());
        assert_eq!(queue.depth().await.unwrap(), 0);
    }
}
