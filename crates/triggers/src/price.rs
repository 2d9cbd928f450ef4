//! Contains the price trigger evaluator.

use crate::{PriceSource, TriggerError};
use chainflow_primitives::{TriggerData, TriggerKind, Workflow};
use tracing::debug;

/// Ready iff the workflow is active and the current price satisfies the
/// trigger's comparator against its threshold. A price that cannot be
/// resolved is an error, which callers treat as not-ready; readiness is
/// never inferred from a failed fetch.
#[derive(Debug)]
pub struct PriceTrigger<P> {
    source: P,
}

impl<P: PriceSource> PriceTrigger<P> {
    /// Creates a new [PriceTrigger] over the given price source.
    pub const fn new(source: P) -> Self {
        Self { source }
    }

    /// Evaluates the trigger.
    pub async fn is_ready(&self, workflow: &Workflow) -> Result<bool, TriggerError> {
        if !workflow.active {
            return Ok(false);
        }
        let TriggerData::Price { token, comparator, price_usd } =
            TriggerData::decode(TriggerKind::Price, &workflow.trigger_data)?
        else {
            return Ok(false);
        };
        let quote = self.source.price_usd(&token).await?;
        let ready = comparator.compare(quote.price, price_usd);
        debug!(
            target: "price_trigger",
            workflow_id = workflow.id,
            token = %token,
            price = quote.price,
            threshold = price_usd,
            source = %quote.source,
            ready,
            "Evaluated price trigger"
        );
        Ok(ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{price_workflow, MockPriceSource};
    use chainflow_primitives::Comparator;

    #[tokio::test]
    async fn test_below_threshold_with_lt_is_ready() {
        let trigger = PriceTrigger::new(MockPriceSource::with_price("ethereum", 1999.5));
        let workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        assert!(trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_at_threshold_with_lt_is_not_ready() {
        let trigger = PriceTrigger::new(MockPriceSource::with_price("ethereum", 2000.0));
        let workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        assert!(!trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_at_threshold_with_le_is_ready() {
        let trigger = PriceTrigger::new(MockPriceSource::with_price("ethereum", 2000.0));
        let workflow = price_workflow("ethereum", Comparator::Le, 2000.0);
        assert!(trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_at_threshold_with_gt_is_not_ready() {
        let trigger = PriceTrigger::new(MockPriceSource::with_price("ethereum", 2000.0));
        let workflow = price_workflow("ethereum", Comparator::Gt, 2000.0);
        assert!(!trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_at_threshold_with_ge_is_ready() {
        let trigger = PriceTrigger::new(MockPriceSource::with_price("ethereum", 2000.0));
        let workflow = price_workflow("ethereum", Comparator::Ge, 2000.0);
        assert!(trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_inactive_skips_price_fetch() {
        let trigger = PriceTrigger::new(MockPriceSource::default());
        let mut workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        workflow.active = false;
        assert!(!trigger.is_ready(&workflow).await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_error_not_ready() {
        let trigger = PriceTrigger::new(MockPriceSource::default());
        let workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        assert!(trigger.is_ready(&workflow).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_trigger_data_is_an_error() {
        let trigger = PriceTrigger::new(MockPriceSource::default());
        let mut workflow = price_workflow("ethereum", Comparator::Lt, 2000.0);
        workflow.trigger_data = vec![0xde, 0xad].into();
        assert!(matches!(
            trigger.is_ready(&workflow).await,
            Err(TriggerError::Malformed(_))
        ));
    }
}
