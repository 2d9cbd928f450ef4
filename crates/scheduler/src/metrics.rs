//! Metrics for the scheduler loop.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, IntCounter};

lazy_static! {
    /// Number of completed sweeps.
    pub static ref SWEEPS_COMPLETED: IntCounter =
        register_int_counter!("chainflow_sweeps_completed", "Number of completed scheduler sweeps")
            .expect("Failed to register counter");
    /// Number of workflow evaluations performed.
    pub static ref WORKFLOWS_SCANNED: IntCounter =
        register_int_counter!("chainflow_workflows_scanned", "Number of workflow evaluations performed")
            .expect("Failed to register counter");
    /// Number of evaluations that found a ready workflow.
    pub static ref WORKFLOWS_READY: IntCounter =
        register_int_counter!("chainflow_workflows_ready", "Number of ready workflows found")
            .expect("Failed to register counter");
    /// Number of jobs pushed to the queue.
    pub static ref JOBS_ENQUEUED: IntCounter =
        register_int_counter!("chainflow_jobs_enqueued", "Number of jobs pushed to the queue")
            .expect("Failed to register counter");
    /// Number of evaluations that failed and were treated as not-ready.
    pub static ref EVALUATION_FAILURES: IntCounter = register_int_counter!(
        "chainflow_evaluation_failures",
        "Number of workflow evaluations that failed"
    )
    .expect("Failed to register counter");
}
