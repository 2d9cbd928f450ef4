#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod signer;
pub use signer::{
    EvmSigner, ExecutionOutcome, ExecutionReceipt, WorkflowExecutor, FALLBACK_GAS_LIMIT,
    MAX_PRIORITY_FEE_PER_GAS,
};

pub mod worker;
pub use worker::JobWorker;

pub mod history;
pub use history::{DiskHistoryStore, ExecutionHistory, ExecutionRecord, MemoryHistoryStore};

pub mod metrics;

pub mod errors;
pub use errors::{ExecutorError, HistoryError};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
