//! Error types for the on-chain gateways.

use thiserror::Error;

/// A failure while reading on-chain state.
///
/// Every variant is retryable from the caller's point of view: the
/// scheduler treats it as not-ready for the current sweep and the worker
/// lets the next sweep re-issue the job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The RPC transport failed.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The contract returned bytes that did not decode.
    #[error("Return data decode error: {0}")]
    Decode(String),
    /// A decoded value did not fit the off-chain representation.
    #[error("Value out of range for {0}")]
    OutOfRange(&'static str),
}

impl From<alloy_sol_types::Error> for ProviderError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
