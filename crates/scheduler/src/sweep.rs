//! Contains the scheduler sweep loop.

use crate::metrics;
use chainflow_primitives::{Job, Workflow};
use chainflow_providers::{ProviderError, WorkflowProvider};
use chainflow_queue::JobQueue;
use chainflow_triggers::TriggerEvaluator;
use futures::StreamExt;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, error, info};

/// Counters from one completed sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Workflow ids scanned.
    pub scanned: u64,
    /// Workflows whose trigger was satisfied.
    pub ready: u64,
    /// Jobs actually pushed to the queue.
    pub enqueued: u64,
    /// Queue depth after the sweep's pushes.
    pub queue_depth: u64,
}

/// The [Scheduler] periodically fans trigger evaluation out over every
/// registered workflow and enqueues the ready ones.
///
/// There is no last-seen tracking: a workflow that stays ready is
/// re-enqueued every poll, and deduplication is delegated to the on-chain
/// executor, which rejects executions whose `next_run` has already been
/// advanced.
#[derive(Debug)]
pub struct Scheduler<W, E, Q> {
    /// The workflow catalog.
    registry: W,
    /// The trigger dispatcher.
    evaluator: E,
    /// The job sink.
    queue: Q,
    /// Sleep between sweeps.
    poll_interval: Duration,
    /// Concurrent evaluations per sweep.
    max_concurrency: usize,
    /// Flipped by the process interrupt handler; the loop stops after the
    /// current sleep.
    running: Arc<AtomicBool>,
}

impl<W, E, Q> Scheduler<W, E, Q>
where
    W: WorkflowProvider + Send + Sync,
    E: TriggerEvaluator + Send + Sync,
    Q: JobQueue + Send + Sync,
{
    /// Creates a new [Scheduler].
    pub fn new(
        registry: W,
        evaluator: E,
        queue: Q,
        poll_interval: Duration,
        max_concurrency: usize,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            registry,
            evaluator,
            queue,
            poll_interval,
            max_concurrency: max_concurrency.max(1),
            running,
        }
    }

    /// Runs the sweep loop until the running flag is lowered. Sweep
    /// failures are logged and the loop continues after the next sleep.
    pub async fn run(&self) {
        info!(
            target: "scheduler",
            poll_interval_secs = self.poll_interval.as_secs(),
            "Scheduler loop started"
        );
        while self.running.load(Ordering::Relaxed) {
            match self.sweep().await {
                Ok(outcome) => {
                    metrics::SWEEPS_COMPLETED.inc();
                    if outcome.enqueued > 0 {
                        info!(
                            target: "scheduler",
                            ready = outcome.ready,
                            enqueued = outcome.enqueued,
                            queue_depth = outcome.queue_depth,
                            "Enqueued ready workflows"
                        );
                    }
                }
                Err(e) => error!(target: "scheduler", "Sweep failed: {e}"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        info!(target: "scheduler", "Scheduler loop stopped");
    }

    /// Performs one sweep over ids `1..=total`.
    ///
    /// Evaluations run concurrently but results are gathered in scan order,
    /// so simultaneously-ready workflows enter the queue by ascending id.
    pub async fn sweep(&self) -> Result<SweepOutcome, ProviderError> {
        let total = self.registry.total_workflows().await?;
        debug!(target: "scheduler", total, "Scanning workflows");

        let ready: Vec<Workflow> = futures::stream::iter(1..=total)
            .map(|id| self.evaluate(id))
            .buffered(self.max_concurrency)
            .filter_map(futures::future::ready)
            .collect()
            .await;

        let mut outcome = SweepOutcome {
            scanned: total,
            ready: ready.len() as u64,
            ..Default::default()
        };
        metrics::WORKFLOWS_SCANNED.inc_by(total);
        metrics::WORKFLOWS_READY.inc_by(outcome.ready);

        for workflow in &ready {
            match Job::from_workflow(workflow) {
                Ok(job) => match self.queue.push_job(&job).await {
                    Ok(()) => {
                        outcome.enqueued += 1;
                        metrics::JOBS_ENQUEUED.inc();
                        info!(
                            target: "scheduler",
                            workflow_id = workflow.id,
                            owner = %workflow.owner,
                            "Enqueued workflow"
                        );
                    }
                    Err(e) => {
                        error!(
                            target: "scheduler",
                            workflow_id = workflow.id,
                            "Failed to enqueue workflow: {e}"
                        );
                    }
                },
                Err(e) => {
                    error!(
                        target: "scheduler",
                        workflow_id = workflow.id,
                        "Failed to build job: {e}"
                    );
                }
            }
        }

        outcome.queue_depth = self.queue.depth().await.unwrap_or_default();
        Ok(outcome)
    }

    /// Evaluates a single id. Any failure is logged and treated as
    /// not-ready so one bad workflow cannot abort the sweep.
    async fn evaluate(&self, id: u64) -> Option<Workflow> {
        let workflow = match self.registry.workflow_by_id(id).await {
            Ok(workflow) => workflow,
            Err(e) => {
                error!(target: "scheduler", workflow_id = id, "Failed to fetch workflow: {e}");
                metrics::EVALUATION_FAILURES.inc();
                return None;
            }
        };
        match self.evaluator.is_ready(&workflow).await {
            Ok(true) => Some(workflow),
            Ok(false) => None,
            Err(e) => {
                error!(target: "scheduler", workflow_id = id, "Trigger evaluation failed: {e}");
                metrics::EVALUATION_FAILURES.inc();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use chainflow_primitives::{ActionKind, Comparator, TriggerKind};
    use chainflow_providers::test_utils::{MockTransferLogProvider, MockWorkflowProvider};
    use chainflow_queue::MemoryJobQueue;
    use chainflow_triggers::{
        test_utils::{price_workflow, workflow_with_next_run, MockPriceSource},
        TriggerSet,
    };

    type TestScheduler = Scheduler<
        MockWorkflowProvider,
        TriggerSet<MockPriceSource, MockTransferLogProvider>,
        MemoryJobQueue,
    >;

    fn scheduler(
        registry: MockWorkflowProvider,
        prices: MockPriceSource,
        queue: MemoryJobQueue,
    ) -> TestScheduler {
        Scheduler::new(
            registry,
            TriggerSet::new(prices, MockTransferLogProvider::default()),
            queue,
            Duration::from_secs(10),
            3,
            Arc::new(AtomicBool::new(true)),
        )
    }

    fn time_workflow(id: u64, next_run: u64) -> chainflow_primitives::Workflow {
        let mut workflow = workflow_with_next_run(next_run);
        workflow.id = id;
        workflow
    }

    #[tokio::test]
    async fn test_ready_time_workflow_is_enqueued() {
        // next_run in the past: one job lands with retry_count 0.
        let queue = MemoryJobQueue::new();
        let registry = MockWorkflowProvider::new([time_workflow(7, 1_700_000_000)]);
        let scheduler = scheduler(registry, MockPriceSource::default(), queue.clone());

        let outcome = scheduler.sweep().await.unwrap();
        assert_eq!(outcome.scanned, 7);
        assert_eq!(outcome.ready, 1);
        assert_eq!(outcome.enqueued, 1);

        let job = queue.pop_job(Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(job.workflow_id, 7);
        assert_eq!(job.trigger_type, TriggerKind::Time);
        assert_eq!(job.action_type, ActionKind::NativeTransfer);
        assert_eq!(job.gas_budget, 10u128.pow(17));
        assert_eq!(job.retry_count, 0);
    }

    #[tokio::test]
    async fn test_not_ready_workflows_are_skipped() {
        let queue = MemoryJobQueue::new();
        let future = chainflow_primitives::unix_now() + 10_000;
        let registry = MockWorkflowProvider::new([time_workflow(1, future)]);
        let scheduler = scheduler(registry, MockPriceSource::default(), queue.clone());

        let outcome = scheduler.sweep().await.unwrap();
        assert_eq!(outcome.ready, 0);
        assert_eq!(queue.depth().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_one_bad_id_does_not_abort_the_sweep() {
        let queue = MemoryJobQueue::new();
        let mut registry =
            MockWorkflowProvider::new([time_workflow(1, 0), time_workflow(3, 0)]);
        // Id 2 is a hole in the catalog and id 1 fails at the RPC layer;
        // id 3 must still be enqueued.
        registry.failing_ids.push(1);
        let scheduler = scheduler(registry, MockPriceSource::default(), queue.clone());

        let outcome = scheduler.sweep().await.unwrap();
        assert_eq!(outcome.scanned, 3);
        assert_eq!(outcome.enqueued, 1);
        let job = queue.pop_job(Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(job.workflow_id, 3);
    }

    #[tokio::test]
    async fn test_simultaneously_ready_ids_enqueue_in_ascending_order() {
        let queue = MemoryJobQueue::new();
        let registry = MockWorkflowProvider::new([
            time_workflow(5, 0),
            time_workflow(2, 0),
            time_workflow(4, 0),
        ]);
        let scheduler = scheduler(registry, MockPriceSource::default(), queue.clone());

        scheduler.sweep().await.unwrap();
        let mut order = Vec::new();
        while let Some(job) = queue.pop_job(Duration::ZERO).await.unwrap() {
            order.push(job.workflow_id);
        }
        assert_eq!(order, vec![2, 4, 5]);
    }

    #[tokio::test]
    async fn test_price_fetch_failure_is_not_ready() {
        // Oracle outage: evaluation errors are swallowed, nothing enqueued.
        let queue = MemoryJobQueue::new();
        let mut workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        workflow.id = 1;
        let registry = MockWorkflowProvider::new([workflow]);
        let scheduler = scheduler(registry, MockPriceSource::default(), queue.clone());

        let outcome = scheduler.sweep().await.unwrap();
        assert_eq!(outcome.ready, 0);
        assert_eq!(outcome.enqueued, 0);
    }

    #[tokio::test]
    async fn test_ready_price_workflow_is_enqueued() {
        let queue = MemoryJobQueue::new();
        let mut workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        workflow.id = 1;
        let registry = MockWorkflowProvider::new([workflow]);
        let scheduler = scheduler(
            registry,
            MockPriceSource::with_price("ethereum", 1999.5),
            queue.clone(),
        );

        let outcome = scheduler.sweep().await.unwrap();
        assert_eq!(outcome.enqueued, 1);
    }

    #[tokio::test]
    async fn test_oversized_gas_budget_is_skipped_not_fatal() {
        let queue = MemoryJobQueue::new();
        let mut workflow = time_workflow(1, 0);
        workflow.gas_budget = U256::MAX;
        let registry = MockWorkflowProvider::new([workflow]);
        let scheduler = scheduler(registry, MockPriceSource::default(), queue.clone());

        let outcome = scheduler.sweep().await.unwrap();
        assert_eq!(outcome.ready, 1);
        assert_eq!(outcome.enqueued, 0);
    }

    #[tokio::test]
    async fn test_owner_filter_helper() {
        let owner = Address::repeat_byte(0xAA);
        let registry = MockWorkflowProvider::new([time_workflow(1, 0), time_workflow(9, 0)]);
        let ids = registry.workflows_by_owner(owner).await.unwrap();
        assert_eq!(ids, vec![1, 9]);
    }
}
