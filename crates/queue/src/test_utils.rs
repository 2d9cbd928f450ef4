//! Test utilities for the job queue.

use crate::{JobQueue, QueueError};
use async_trait::async_trait;
use chainflow_primitives::Job;
use std::{collections::VecDeque, sync::Arc, time::Duration};
use tokio::sync::{Mutex, Notify};

/// An in-memory [JobQueue] with the same FIFO and blocking-pop semantics as
/// the Redis-backed queue. Payloads still round-trip through JSON so codec
/// behavior is exercised.
#[derive(Debug, Default, Clone)]
pub struct MemoryJobQueue {
    inner: Arc<Mutex<VecDeque<String>>>,
    notify: Arc<Notify>,
}

impl MemoryJobQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn push_job(&self, job: &Job) -> Result<(), QueueError> {
        let payload = serde_json::to_string(job)?;
        self.inner.lock().await.push_back(payload);
        self.notify.notify_one();
        Ok(())
    }

    async fn pop_job(&self, timeout: Duration) -> Result<Option<Job>, QueueError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(payload) = self.inner.lock().await.pop_front() {
                return Ok(Some(serde_json::from_str(&payload)?));
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
        }
    }

    async fn depth(&self) -> Result<u64, QueueError> {
        Ok(self.inner.lock().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use chainflow_primitives::{ActionKind, TriggerKind};

    fn job(id: u64) -> Job {
        Job {
            workflow_id: id,
            owner: Address::repeat_byte(0x01),
            trigger_type: TriggerKind::Time,
            action_type: ActionKind::NativeTransfer,
            action_data: String::new(),
            next_run: 0,
            gas_budget: 1,
            interval: 60,
            retry_count: 0,
        }
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = MemoryJobQueue::new();
        for id in 1..=5 {
            queue.push_job(&job(id)).await.unwrap();
        }
        assert_eq!(queue.depth().await.unwrap(), 5);
        for id in 1..=5 {
            let popped = queue.pop_job(Duration::ZERO).await.unwrap().unwrap();
            assert_eq!(popped.workflow_id, id);
        }
        assert_eq!(queue.depth().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_pop_times_out() {
        let queue = MemoryJobQueue::new();
        let popped = queue.pop_job(Duration::from_millis(10)).await.unwrap();
        assert!(popped.is_none());
    }

    #[tokio::test]
    async fn test_blocking_pop_sees_concurrent_push() {
        let queue = MemoryJobQueue::new();
        let consumer = queue.clone();
        let handle =
            tokio::spawn(async move { consumer.pop_job(Duration::from_secs(5)).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push_job(&job(42)).await.unwrap();
        let popped = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(popped.workflow_id, 42);
    }
}
