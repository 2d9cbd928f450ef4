//! This module contains the semantic action records and their codec.
//!
//! An action's wire form is a single type-tag byte followed by the
//! ABI-encoded parameters of that action family. The off-chain engine
//! passes action bytes through unchanged; this codec exists for tooling
//! that builds workflows and for validating round trips.

use crate::{ActionKind, CodecError};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol_data, SolType};

/// ABI layout of a NATIVE_TRANSFER action: `(address recipient, uint256 amount)`.
type NativeTransferAbi = (sol_data::Address, sol_data::Uint<256>);
/// ABI layout of an ERC20_TRANSFER action: `(address token, address recipient, uint256 amount)`.
type Erc20TransferAbi = (sol_data::Address, sol_data::Address, sol_data::Uint<256>);
/// ABI layout of a CONTRACT_CALL action: `(address target, uint256 value, bytes callData)`.
type ContractCallAbi = (sol_data::Address, sol_data::Uint<256>, sol_data::Bytes);

/// A decoded action record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionData {
    /// Transfer `amount` of the native currency to `recipient`.
    NativeTransfer {
        /// The recipient address.
        recipient: Address,
        /// The amount in the smallest native unit.
        amount: U256,
    },
    /// Transfer `amount` of `token` to `recipient`.
    Erc20Transfer {
        /// The ERC-20 contract.
        token: Address,
        /// The recipient address.
        recipient: Address,
        /// The amount in the token's smallest unit.
        amount: U256,
    },
    /// Call `target` with `value` and `calldata`.
    ContractCall {
        /// The contract to call.
        target: Address,
        /// The native value to attach.
        value: U256,
        /// The encoded call data.
        calldata: Bytes,
    },
}

impl ActionData {
    /// Encodes the record into its wire form: type byte + ABI params.
    pub fn encode(&self) -> Vec<u8> {
        let (tag, params) = match self {
            Self::NativeTransfer { recipient, amount } => {
                (1u8, NativeTransferAbi::abi_encode_params(&(*recipient, *amount)))
            }
            Self::Erc20Transfer { token, recipient, amount } => {
                (2u8, Erc20TransferAbi::abi_encode_params(&(*token, *recipient, *amount)))
            }
            Self::ContractCall { target, value, calldata } => {
                (3u8, ContractCallAbi::abi_encode_params(&(*target, *value, calldata.to_vec())))
            }
        };
        let mut encoded = Vec::with_capacity(1 + params.len());
        encoded.push(tag);
        encoded.extend_from_slice(&params);
        encoded
    }

    /// Decodes the wire form back into a record.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let (tag, params) = data
            .split_first()
            .ok_or(CodecError::TooShort { expected: 1, actual: data.len() })?;
        match ActionKind::try_from(*tag)? {
            ActionKind::NativeTransfer => {
                let (recipient, amount) = NativeTransferAbi::abi_decode_params(params, true)?;
                Ok(Self::NativeTransfer { recipient, amount })
            }
            ActionKind::Erc20Transfer => {
                let (token, recipient, amount) = Erc20TransferAbi::abi_decode_params(params, true)?;
                Ok(Self::Erc20Transfer { token, recipient, amount })
            }
            ActionKind::ContractCall => {
                let (target, value, calldata) = ContractCallAbi::abi_decode_params(params, true)?;
                Ok(Self::ContractCall { target, value, calldata: calldata.into() })
            }
        }
    }

    /// Returns the action family of this record.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::NativeTransfer { .. } => ActionKind::NativeTransfer,
            Self::Erc20Transfer { .. } => ActionKind::Erc20Transfer,
            Self::ContractCall { .. } => ActionKind::ContractCall,
        }
    }
}
