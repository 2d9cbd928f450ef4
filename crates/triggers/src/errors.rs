//! Error types for trigger evaluation.

use chainflow_primitives::CodecError;
use chainflow_providers::ProviderError;
use thiserror::Error;

/// A failure while resolving a price.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(String),
    /// The oracle request failed or returned a non-success status.
    #[error("Oracle request failed: {0}")]
    Oracle(String),
    /// The oracle responded but without a price for the asset.
    #[error("Price for {0} missing from oracle response")]
    MissingPrice(String),
    /// The backend request failed or reported an unsuccessful lookup.
    #[error("Backend request failed: {0}")]
    Backend(String),
}

/// A failure while evaluating a trigger. The scheduler treats every variant
/// as not-ready for the current sweep; none of them abort a scan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriggerError {
    /// The trigger data did not decode in either wire form.
    #[error("Malformed trigger data: {0}")]
    Malformed(#[from] CodecError),
    /// Every price tier failed.
    #[error(transparent)]
    Price(#[from] PriceError),
    /// The transfer log scan failed.
    #[error("Log scan failed: {0}")]
    Logs(#[from] ProviderError),
}
