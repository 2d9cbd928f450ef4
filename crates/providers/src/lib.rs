#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod traits;
pub use traits::{EscrowProvider, TransferLogProvider, WorkflowProvider};

pub mod bindings;
pub use bindings::{IActionExecutor, IFeeEscrow, IWorkflowRegistry, Transfer};

pub mod registry;
pub use registry::RegistryGateway;

pub mod escrow;
pub use escrow::EscrowGateway;

pub mod logs;
pub use logs::{LogScanner, DEFAULT_LOOKBACK_BLOCKS};

pub mod errors;
pub use errors::ProviderError;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
