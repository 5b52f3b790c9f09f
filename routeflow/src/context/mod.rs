//! Execution context for runs.
//!
//! This module provides:
//! - [`RunContext`], carrying identity, deadline, and the active span
//! - [`CancelSignal`] for cooperative cancellation

mod cancel;
mod run_context;

pub use cancel::CancelSignal;
pub use run_context::RunContext;
