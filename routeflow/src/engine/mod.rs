//! Run execution.
//!
//! This module provides:
//! - The [`run`] driver and its routing loop
//! - Run options and [`RunConfig`]
//! - Pooled ledgers for cyclic-call detection

mod config;
mod driver;
mod ledger;
mod options;

pub use config::RunConfig;
pub use driver::run;
pub use ledger::{CycleLedger, LedgerPool, MAX_POOLED_LEDGERS, MAX_RETAINED_CAPACITY};
pub(crate) use options::RunSettings;
pub use options::{
    with_config, with_cyclic_check, with_json_snapshot, with_max_steps, with_post_wrap,
    with_pre_wrap, with_snapshot, with_stage_logging, RunOption,
};
