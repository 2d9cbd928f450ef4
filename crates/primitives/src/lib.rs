#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod workflow;
pub use workflow::{ActionKind, TriggerKind, Workflow};

pub mod trigger;
pub use trigger::{Comparator, TransferDirection, TriggerData};

pub mod action;
pub use action::ActionData;

pub mod job;
pub use job::{Job, JOB_QUEUE_KEY};

pub mod errors;
pub use errors::CodecError;

pub mod time;
pub use time::unix_now;
