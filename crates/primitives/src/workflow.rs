//! This module contains the [Workflow] snapshot type and its discriminant enums.

use crate::CodecError;
use alloy_primitives::{Address, Bytes, U256};

/// The trigger family of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TriggerKind {
    /// Fires when the wall clock passes `next_run`.
    Time,
    /// Fires when an asset price satisfies a comparator against a threshold.
    Price,
    /// Fires when a watched wallet receives a qualifying transfer.
    WalletEvent,
}

impl TryFrom<u8> for TriggerKind {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Time),
            2 => Ok(Self::Price),
            3 => Ok(Self::WalletEvent),
            _ => Err(CodecError::UnknownDiscriminant { field: "triggerType", value }),
        }
    }
}

impl From<TriggerKind> for u8 {
    fn from(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Time => 1,
            TriggerKind::Price => 2,
            TriggerKind::WalletEvent => 3,
        }
    }
}

/// The action family of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ActionKind {
    /// Transfer of the native currency.
    NativeTransfer,
    /// Transfer of an ERC-20 token.
    Erc20Transfer,
    /// Arbitrary contract call.
    ContractCall,
}

impl TryFrom<u8> for ActionKind {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::NativeTransfer),
            2 => Ok(Self::Erc20Transfer),
            3 => Ok(Self::ContractCall),
            _ => Err(CodecError::UnknownDiscriminant { field: "actionType", value }),
        }
    }
}

impl From<ActionKind> for u8 {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::NativeTransfer => 1,
            ActionKind::Erc20Transfer => 2,
            ActionKind::ContractCall => 3,
        }
    }
}

/// A read-only snapshot of an on-chain workflow.
///
/// The authoritative copy lives in the registry contract; all fields here
/// are views decoded from a single `getWorkflow` call. `next_run` only
/// advances on-chain when an execution succeeds, which is what makes
/// duplicate enqueues of the same workflow harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    /// The workflow id, dense starting at 1, never reused.
    pub id: u64,
    /// The owner whose escrow balance funds executions.
    pub owner: Address,
    /// The trigger family.
    pub trigger_kind: TriggerKind,
    /// Trigger parameters, opaque until decoded per [TriggerKind].
    pub trigger_data: Bytes,
    /// The action family.
    pub action_kind: ActionKind,
    /// Action parameters, passed through unchanged to the executor contract.
    pub action_data: Bytes,
    /// Unix seconds of the earliest next execution.
    pub next_run: u64,
    /// Reschedule delta in seconds applied on successful execution.
    pub interval: u64,
    /// Inactive workflows never fire.
    pub active: bool,
    /// Maximum native-currency amount debitable per execution.
    pub gas_budget: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_kind_discriminants() {
        for (raw, kind) in
            [(1, TriggerKind::Time), (2, TriggerKind::Price), (3, TriggerKind::WalletEvent)]
        {
            assert_eq!(TriggerKind::try_from(raw).unwrap(), kind);
            assert_eq!(u8::from(kind), raw);
        }
        assert!(TriggerKind::try_from(0).is_err());
        assert!(TriggerKind::try_from(4).is_err());
    }

    #[test]
    fn test_action_kind_discriminants() {
        for (raw, kind) in [
            (1, ActionKind::NativeTransfer),
            (2, ActionKind::Erc20Transfer),
            (3, ActionKind::ContractCall),
        ] {
            assert_eq!(ActionKind::try_from(raw).unwrap(), kind);
            assert_eq!(u8::from(kind), raw);
        }
        assert!(ActionKind::try_from(0).is_err());
    }
}
