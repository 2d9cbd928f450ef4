//! Contains the Redis-backed implementation of the [JobQueue] trait.

use crate::{JobQueue, QueueError};
use async_trait::async_trait;
use chainflow_primitives::{Job, JOB_QUEUE_KEY};
use redis::{aio::MultiplexedConnection, AsyncCommands};
use std::time::Duration;
use tracing::debug;

/// A [JobQueue] over a Redis list. Pushes land at the tail via `RPUSH`;
/// pops block at the head via `BLPOP`.
#[derive(Clone)]
pub struct RedisJobQueue {
    /// The multiplexed broker connection. Cloning is cheap and each clone
    /// may be used concurrently.
    conn: MultiplexedConnection,
}

impl std::fmt::Debug for RedisJobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisJobQueue").field("key", &JOB_QUEUE_KEY).finish_non_exhaustive()
    }
}

impl RedisJobQueue {
    /// Connects to the broker at `url` and verifies the connection with a
    /// `PING` round trip.
    pub async fn connect(url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(url).map_err(|e| QueueError::Connect(e.to_string()))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::Connect(e.to_string()))?;
        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| QueueError::Connect(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn push_job(&self, job: &Job) -> Result<(), QueueError> {
        let payload = serde_json::to_string(job)?;
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(JOB_QUEUE_KEY, payload)
            .await
            .map_err(|e| QueueError::Broker(e.to_string()))?;
        debug!(target: "job_queue", workflow_id = job.workflow_id, "Enqueued job");
        Ok(())
    }

    async fn pop_job(&self, timeout: Duration) -> Result<Option<Job>, QueueError> {
        let mut conn = self.conn.clone();
        let popped: Option<(String, String)> = conn
            .blpop(JOB_QUEUE_KEY, timeout.as_secs_f64())
            .await
            .map_err(|e| QueueError::Broker(e.to_string()))?;
        match popped {
            Some((_, payload)) => {
                let job: Job = serde_json::from_str(&payload)?;
                debug!(target: "job_queue", workflow_id = job.workflow_id, "Dequeued job");
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }

    async fn depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.conn.clone();
        conn.llen(JOB_QUEUE_KEY).await.map_err(|e| QueueError::Broker(e.to_string()))
    }
}
