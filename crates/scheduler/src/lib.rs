#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod metrics;

pub mod sweep;
pub use sweep::{Scheduler, SweepOutcome};
