//! Error types for transaction execution and the history store.

use thiserror::Error;

/// A failure while building, signing, or submitting an execution
/// transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// An RPC round trip failed.
    #[error("RPC error: {0}")]
    Rpc(String),
    /// The transaction could not be built or signed.
    #[error("Transaction build error: {0}")]
    Wallet(String),
    /// The node rejected the submission for lack of funds, either the
    /// owner's escrow or the signer's own balance.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
}

impl ExecutorError {
    /// Classifies an RPC failure by its error text, per the node's habit of
    /// reporting underfunding only in the message.
    pub fn from_rpc(message: String) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("insufficient balance") || lowered.contains("insufficient funds") {
            Self::InsufficientFunds(message)
        } else {
            Self::Rpc(message)
        }
    }

    /// Returns true if this failure means the payer cannot cover the
    /// execution. Dropped without re-enqueue; the next sweep re-issues.
    pub const fn is_underfunded(&self) -> bool {
        matches!(self, Self::InsufficientFunds(_))
    }
}

/// A failure in the execution history store.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The database could not be opened.
    #[error("Failed to open history store: {0}")]
    Open(String),
    /// A read or write failed.
    #[error("History store error: {0}")]
    Database(String),
    /// A stored record did not decode.
    #[error("History record codec error: {0}")]
    Codec(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_classification() {
        assert!(ExecutorError::from_rpc("execution reverted: Insufficient balance".to_string())
            .is_underfunded());
        assert!(ExecutorError::from_rpc("insufficient funds for gas * price + value".to_string())
            .is_underfunded());
        assert!(!ExecutorError::from_rpc("nonce too low".to_string()).is_underfunded());
    }
}
