//! Core domain model types for routeflow.
//!
//! This module contains the fundamental types used throughout the engine:
//! - The [`Request`] container and [`DeferFn`] compensating actions
//! - The [`Transition`] trait, the [`State`] handle, and closure adapters

mod request;
mod transition;

pub use request::{DeferFn, Request};
pub use transition::{
    async_transition, transition, AsyncFnTransition, FnTransition, State, Transition,
};
