//! Contains the trigger dispatcher the scheduler evaluates workflows with.

use crate::{PriceSource, PriceTrigger, TimeTrigger, TriggerError, WalletEventTrigger};
use async_trait::async_trait;
use chainflow_primitives::{TriggerKind, Workflow};
use chainflow_providers::TransferLogProvider;

/// Decides whether a workflow's trigger is currently satisfied.
#[async_trait]
pub trait TriggerEvaluator {
    /// Returns true if the workflow should be executed now.
    async fn is_ready(&self, workflow: &Workflow) -> Result<bool, TriggerError>;
}

/// The production [TriggerEvaluator]: one evaluator per trigger family,
/// dispatched on the workflow's `trigger_kind`.
#[derive(Debug)]
pub struct TriggerSet<P, L> {
    time: TimeTrigger,
    price: PriceTrigger<P>,
    wallet_event: WalletEventTrigger<L>,
}

impl<P: PriceSource, L: TransferLogProvider> TriggerSet<P, L> {
    /// Creates a new [TriggerSet] from its price source and log scanner.
    pub const fn new(price_source: P, log_provider: L) -> Self {
        Self {
            time: TimeTrigger,
            price: PriceTrigger::new(price_source),
            wallet_event: WalletEventTrigger::new(log_provider),
        }
    }

    /// Overrides the wallet-event scan window.
    pub fn with_lookback(mut self, lookback: u64) -> Self {
        self.wallet_event = self.wallet_event.with_lookback(lookback);
        self
    }
}

#[async_trait]
impl<P, L> TriggerEvaluator for TriggerSet<P, L>
where
    P: PriceSource + Send + Sync,
    L: TransferLogProvider + Send + Sync,
{
    async fn is_ready(&self, workflow: &Workflow) -> Result<bool, TriggerError> {
        match workflow.trigger_kind {
            TriggerKind::Time => Ok(self.time.is_ready(workflow)),
            TriggerKind::Price => self.price.is_ready(workflow).await,
            TriggerKind::WalletEvent => self.wallet_event.is_ready(workflow).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{price_workflow, workflow_with_next_run, MockPriceSource};
    use chainflow_primitives::Comparator;
    use chainflow_providers::test_utils::MockTransferLogProvider;

    fn trigger_set() -> TriggerSet<MockPriceSource, MockTransferLogProvider> {
        TriggerSet::new(
            MockPriceSource::with_price("ethereum", 1999.5),
            MockTransferLogProvider::default(),
        )
    }

    #[tokio::test]
    async fn test_dispatches_time_triggers() {
        let workflow = workflow_with_next_run(0);
        assert!(trigger_set().is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_dispatches_price_triggers() {
        let workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        assert!(trigger_set().is_ready(&workflow).await.unwrap());
    }
}
