//! Pre-wrap and post-wrap hooks (middleware) for transitions.

mod chain;
mod timing;

pub use chain::{hook, FnHook, HookChain, WrapHook};
pub use timing::{LoggingHook, StageTiming, StageTimings};
