//! Contains the alloy-backed gateway over the fee escrow contract.

use crate::{bindings::IFeeEscrow, EscrowProvider, ProviderError};
use alloy_primitives::{Address, TxKind, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use alloy_transport_http::Http;
use async_trait::async_trait;
use reqwest::Client;

/// The [EscrowGateway] reads user gas balances from the escrow contract.
/// Used by the worker's preflight check before it spends gas on a
/// submission that would revert.
#[derive(Debug, Clone)]
pub struct EscrowGateway<T: Provider<Http<Client>>> {
    /// The inner Ethereum JSON-RPC provider.
    inner: T,
    /// The escrow contract address.
    address: Address,
}

impl<T: Provider<Http<Client>>> EscrowGateway<T> {
    /// Creates a new [EscrowGateway] for the contract at `address`.
    pub const fn new(inner: T, address: Address) -> Self {
        Self { inner, address }
    }
}

#[async_trait]
impl<T: Provider<Http<Client>> + Send + Sync> EscrowProvider for EscrowGateway<T> {
    async fn balance_of(&self, user: Address) -> Result<U256, ProviderError> {
        let calldata = IFeeEscrow::balancesCall { user }.abi_encode();
        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.address)),
            input: TransactionInput::new(calldata.into()),
            ..Default::default()
        };
        let output = self
            .inner
            .call(&tx)
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let decoded = IFeeEscrow::balancesCall::abi_decode_returns(&output, true)?;
        Ok(decoded.balance)
    }
}
