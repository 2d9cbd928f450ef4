#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod time;
pub use time::TimeTrigger;

pub mod price;
pub use price::PriceTrigger;

pub mod wallet_event;
pub use wallet_event::WalletEventTrigger;

pub mod evaluator;
pub use evaluator::{TriggerEvaluator, TriggerSet};

pub mod adapter;
pub use adapter::{oracle_id, PriceAdapter, PriceQuote, PriceSource, LOCAL_CACHE_TTL};

pub mod oracle;
pub use oracle::{CoinGeckoClient, PriceOracle};

pub mod backend;
pub use backend::{BackendApi, BackendClient};

pub mod health;
pub use health::{BackendHealth, BackendState, REPROBE_INTERVAL};

pub mod errors;
pub use errors::{PriceError, TriggerError};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
