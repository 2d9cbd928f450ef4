//! Error types for the trigger, action, and job codecs.

use thiserror::Error;

/// An error decoding or encoding one of the wire records.
///
/// Malformed on-chain data is never fatal to a sweep; callers log the error
/// and treat the workflow as not-ready.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The payload could not be decoded as ABI data.
    #[error("ABI decode error: {0}")]
    Abi(String),
    /// The payload looked like JSON but failed to parse.
    #[error("JSON decode error: {0}")]
    Json(String),
    /// An enum discriminant outside the known range.
    #[error("Unknown discriminant {value} for {field}")]
    UnknownDiscriminant {
        /// The field that carried the discriminant.
        field: &'static str,
        /// The offending value.
        value: u8,
    },
    /// The payload was too short to carry the expected record.
    #[error("Payload too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// The minimum expected length.
        expected: usize,
        /// The actual length.
        actual: usize,
    },
    /// A hex string field failed to parse.
    #[error("Invalid hex: {0}")]
    Hex(String),
    /// A numeric field does not fit the wire representation.
    #[error("Value out of range for {0}")]
    OutOfRange(&'static str),
    /// The semantic record has no representation in the on-chain ABI form.
    #[error("Record not representable in ABI form: {0}")]
    Unrepresentable(&'static str),
}

impl From<alloy_sol_types::Error> for CodecError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Abi(err.to_string())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
