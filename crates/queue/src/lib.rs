#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod traits;
pub use traits::JobQueue;

pub mod redis_queue;
pub use redis_queue::RedisJobQueue;

pub mod errors;
pub use errors::QueueError;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::MemoryJobQueue;
