//! Run options and the per-run settings they configure.

use super::RunConfig;
use crate::core::Request;
use crate::interceptors::{HookChain, WrapHook};
use crate::observability::{json_snapshot, SnapshotFn};
use serde::Serialize;
use std::sync::Arc;

/// A run option. Applied in order after validation; an error aborts the run
/// before any transition executes.
pub type RunOption<T> = Box<dyn FnOnce(&mut Request<T>) -> anyhow::Result<()> + Send>;

/// Driver settings accumulated from options.
pub(crate) struct RunSettings<T> {
    pub(crate) cyclic_check: bool,
    pub(crate) log_stages: bool,
    pub(crate) max_steps: Option<usize>,
    pub(crate) pre_wrap: HookChain<T>,
    pub(crate) post_wrap: HookChain<T>,
    pub(crate) snapshot: Option<SnapshotFn<T>>,
}

impl<T> Default for RunSettings<T> {
    fn default() -> Self {
        Self {
            cyclic_check: false,
            log_stages: false,
            max_steps: None,
            pre_wrap: HookChain::new(),
            post_wrap: HookChain::new(),
            snapshot: None,
        }
    }
}

/// Aborts the run when a transition name is entered a second time.
pub fn with_cyclic_check<T: 'static>() -> RunOption<T> {
    Box::new(|req: &mut Request<T>| {
        req.settings.cyclic_check = true;
        Ok(())
    })
}

/// Logs every transition's start, finish, and failure.
pub fn with_stage_logging<T: 'static>() -> RunOption<T> {
    Box::new(|req: &mut Request<T>| {
        req.settings.log_stages = true;
        Ok(())
    })
}

/// Fails the run once it has executed `limit` transitions.
pub fn with_max_steps<T: 'static>(limit: usize) -> RunOption<T> {
    Box::new(move |req: &mut Request<T>| {
        if limit == 0 {
            anyhow::bail!("step budget must be at least 1");
        }
        req.settings.max_steps = Some(limit);
        Ok(())
    })
}

/// Registers hooks run before every transition, in the given order.
pub fn with_pre_wrap<T, I>(hooks: I) -> RunOption<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Arc<dyn WrapHook<T>>>,
{
    let hooks: Vec<_> = hooks.into_iter().collect();
    Box::new(move |req: &mut Request<T>| {
        if hooks.is_empty() {
            anyhow::bail!("no pre-wrap hooks supplied");
        }
        req.settings.pre_wrap.extend(hooks);
        Ok(())
    })
}

/// Registers hooks run after every transition, in the given order.
pub fn with_post_wrap<T, I>(hooks: I) -> RunOption<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Arc<dyn WrapHook<T>>>,
{
    let hooks: Vec<_> = hooks.into_iter().collect();
    Box::new(move |req: &mut Request<T>| {
        if hooks.is_empty() {
            anyhow::bail!("no post-wrap hooks supplied");
        }
        req.settings.post_wrap.extend(hooks);
        Ok(())
    })
}

/// Uses `snapshot` to render the payload in trace events.
pub fn with_snapshot<T: 'static>(snapshot: SnapshotFn<T>) -> RunOption<T> {
    Box::new(move |req: &mut Request<T>| {
        req.settings.snapshot = Some(snapshot);
        Ok(())
    })
}

/// Renders the payload as JSON in trace events.
pub fn with_json_snapshot<T: Serialize + 'static>() -> RunOption<T> {
    with_snapshot(json_snapshot())
}

/// Applies a [`RunConfig`].
pub fn with_config<T: 'static>(config: RunConfig) -> RunOption<T> {
    Box::new(move |req: &mut Request<T>| {
        config.validate()?;
        req.settings.cyclic_check |= config.cyclic_check;
        req.settings.log_stages |= config.log_stages;
        if config.max_steps.is_some() {
            req.settings.max_steps = config.max_steps;
        }
        Ok(())
    })
}
