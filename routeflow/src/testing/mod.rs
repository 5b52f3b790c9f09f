//! Testing utilities for routed runs.
//!
//! This module provides:
//! - Spy transitions that count invocations
//! - Recording hooks and a shared call log for ordering assertions

mod mocks;

pub use mocks::{stopping_spy, CallLog, RecordingHook, SpyTransition};
