//! # Routeflow
//!
//! A state-routing execution engine for multi-step request pipelines.
//!
//! Each step of a run is a *transition*: a named unit of work that receives
//! the [`Request`](core::Request), mutates its payload, and names the next
//! transition (or ends the run). Routeflow provides:
//!
//! - **Routed execution**: a driver loop that follows the transition each step selects
//! - **Compensating actions**: deferred closures executed last-registered-first
//! - **Cycle detection**: optional per-run detection of repeated transitions
//! - **Wrap hooks**: pre-wrap and post-wrap middleware around every transition
//! - **Tracing**: per-run and per-transition spans with payload snapshots
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use routeflow::prelude::*;
//!
//! let ship = transition("ship", |req: Request<Order>| req.stop());
//! let charge = transition("charge", move |mut req: Request<Order>| {
//!     req.data.charged = true;
//!     req.route_to(ship.clone())
//! });
//!
//! let req = Request::start(RunContext::new(), order, charge);
//! let done = run("checkout", req, vec![with_cyclic_check()]).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod core;
pub mod engine;
pub mod errors;
pub mod interceptors;
pub mod observability;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{CancelSignal, RunContext};
    pub use crate::core::{async_transition, transition, DeferFn, Request, State, Transition};
    pub use crate::engine::{
        run, with_config, with_cyclic_check, with_json_snapshot, with_max_steps,
        with_post_wrap, with_pre_wrap, with_snapshot, with_stage_logging, RunConfig, RunOption,
    };
    pub use crate::errors::{CyclicError, HookPhase, RouterError, RunFailure, ValidationError};
    pub use crate::interceptors::{hook, LoggingHook, StageTimings, WrapHook};
}
