//! Metrics for the job worker and signer.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, IntCounter};

lazy_static! {
    /// Number of transactions submitted to the chain.
    pub static ref TRANSACTIONS_SUBMITTED: IntCounter =
        register_int_counter!("chainflow_transactions_submitted", "Number of execution transactions submitted")
            .expect("Failed to register counter");
    /// Number of jobs executed with a success receipt.
    pub static ref JOBS_EXECUTED: IntCounter =
        register_int_counter!("chainflow_jobs_executed", "Number of jobs executed successfully")
            .expect("Failed to register counter");
    /// Number of jobs dropped by the escrow preflight check.
    pub static ref JOBS_DROPPED_UNDERFUNDED: IntCounter = register_int_counter!(
        "chainflow_jobs_dropped_underfunded",
        "Number of jobs dropped because the owner's escrow could not cover the gas budget"
    )
    .expect("Failed to register counter");
    /// Number of executions that reverted on-chain.
    pub static ref JOBS_REVERTED: IntCounter =
        register_int_counter!("chainflow_jobs_reverted", "Number of executions that reverted")
            .expect("Failed to register counter");
    /// Number of receipt waits that timed out.
    pub static ref RECEIPT_TIMEOUTS: IntCounter =
        register_int_counter!("chainflow_receipt_timeouts", "Number of receipt waits that timed out")
            .expect("Failed to register counter");
    /// Number of jobs that failed before a receipt.
    pub static ref JOB_FAILURES: IntCounter =
        register_int_counter!("chainflow_job_failures", "Number of jobs whose execution failed")
            .expect("Failed to register counter");
}
