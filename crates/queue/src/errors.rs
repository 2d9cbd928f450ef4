//! Error types for the job queue.

use thiserror::Error;

/// A failure while talking to the queue broker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The broker could not be reached at construction time.
    #[error("Queue connection error: {0}")]
    Connect(String),
    /// A push or pop round trip failed.
    #[error("Queue broker error: {0}")]
    Broker(String),
    /// A payload did not serialize or deserialize.
    #[error("Queue payload codec error: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(err.to_string())
    }
}
