//! The seam trait for the durable job queue.

use crate::QueueError;
use async_trait::async_trait;
use chainflow_primitives::Job;
use std::time::Duration;

/// A durable FIFO queue of execution jobs.
///
/// The queue tolerates multiple producers and consumers, but the engine
/// runs one of each: the scheduler pushes, the worker pops. A popped job is
/// owned by the consumer; there is no persisted record after consumption.
#[async_trait]
pub trait JobQueue {
    /// Appends a job at the tail of the queue.
    async fn push_job(&self, job: &Job) -> Result<(), QueueError>;

    /// Removes and returns the job at the head of the queue, waiting up to
    /// `timeout` for one to appear. `Ok(None)` means the queue stayed empty.
    async fn pop_job(&self, timeout: Duration) -> Result<Option<Job>, QueueError>;

    /// Returns the number of jobs currently queued.
    async fn depth(&self) -> Result<u64, QueueError>;
}
