//! Test utilities for trigger evaluation.

use crate::{BackendApi, PriceError, PriceOracle, PriceQuote, PriceSource};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use chainflow_primitives::{
    ActionKind, Comparator, TriggerData, TriggerKind, Workflow,
};
use std::collections::HashMap;

/// A mock [PriceSource] with fixed quotes.
#[derive(Debug, Default, Clone)]
pub struct MockPriceSource {
    /// Quotes per symbol; missing symbols fail the lookup.
    pub quotes: HashMap<String, f64>,
}

impl MockPriceSource {
    /// Creates a source quoting a single symbol.
    pub fn with_price(symbol: &str, price: f64) -> Self {
        Self { quotes: HashMap::from([(symbol.to_string(), price)]) }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn price_usd(&self, symbol: &str) -> Result<PriceQuote, PriceError> {
        self.quotes
            .get(symbol)
            .map(|price| PriceQuote { price: *price, source: "mock".to_string() })
            .ok_or_else(|| PriceError::MissingPrice(symbol.to_string()))
    }
}

/// A mock [PriceOracle] with fixed prices per oracle id.
#[derive(Debug, Default, Clone)]
pub struct MockOracle {
    /// Prices per oracle id; missing ids fail the fetch.
    pub prices: HashMap<String, f64>,
}

impl MockOracle {
    /// Creates an oracle quoting a single asset.
    pub fn with_price(id: &str, price: f64) -> Self {
        Self { prices: HashMap::from([(id.to_string(), price)]) }
    }
}

#[async_trait]
impl PriceOracle for MockOracle {
    async fn fetch_usd(&self, id: &str) -> Result<f64, PriceError> {
        self.prices.get(id).copied().ok_or_else(|| PriceError::MissingPrice(id.to_string()))
    }
}

/// A mock [BackendApi].
#[derive(Debug, Default, Clone)]
pub struct MockBackend {
    /// Health probe answer.
    pub healthy: bool,
    /// Price returned for any id; `None` fails the fetch.
    pub price: Option<f64>,
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn health_check(&self) -> bool {
        self.healthy
    }

    async fn price(&self, id: &str) -> Result<PriceQuote, PriceError> {
        self.price
            .map(|price| PriceQuote { price, source: "cache".to_string() })
            .ok_or_else(|| PriceError::Backend(format!("no backend price for {id}")))
    }
}

/// An active time-triggered workflow with the given `next_run`.
pub fn workflow_with_next_run(next_run: u64) -> Workflow {
    Workflow {
        id: 7,
        owner: Address::repeat_byte(0xAA),
        trigger_kind: TriggerKind::Time,
        trigger_data: Bytes::new(),
        action_kind: ActionKind::NativeTransfer,
        action_data: Bytes::new(),
        next_run,
        interval: 3600,
        active: true,
        gas_budget: U256::from(10u128.pow(17)),
    }
}

/// An active price-triggered workflow with JSON trigger data.
pub fn price_workflow(token: &str, comparator: Comparator, price_usd: f64) -> Workflow {
    let mut workflow = workflow_with_next_run(0);
    workflow.trigger_kind = TriggerKind::Price;
    workflow.trigger_data = format!(
        r#"{{"token": "{token}", "comparator": {}, "price_usd": {price_usd}}}"#,
        u8::from(comparator)
    )
    .into_bytes()
    .into();
    workflow
}

/// An active wallet-event workflow with JSON trigger data monitoring the
/// owner; `token: None` encodes the native branch via the ABI form.
pub fn wallet_event_workflow(token: Option<Address>, min_amount: u64) -> Workflow {
    let mut workflow = workflow_with_next_run(0);
    workflow.trigger_kind = TriggerKind::WalletEvent;
    workflow.trigger_data = match token {
        Some(token) => format!(
            r#"{{"monitor": "{}", "token": "{}", "min_amount": {min_amount}}}"#,
            workflow.owner, token
        )
        .into_bytes()
        .into(),
        None => TriggerData::WalletEvent {
            monitor: None,
            token: None,
            min_amount: U256::from(min_amount),
            direction: chainflow_primitives::TransferDirection::In,
        }
        .abi_encode()
        .unwrap_or_default()
        .into(),
    };
    workflow
}
